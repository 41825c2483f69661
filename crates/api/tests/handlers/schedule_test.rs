use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mockall::predicate;
use pretty_assertions::assert_eq;
use speakmatch_core::{
    errors::SpeakError,
    models::request::{ScheduleSessionRequest, SCHEDULED_REQUEST_TTL_DAYS},
    timeclock,
};
use speakmatch_db::models::DbScheduledRequest;
use uuid::Uuid;

use crate::test_utils::TestContext;
use speakmatch_api::email::ScheduleEmail;
use speakmatch_api::middleware::error_handling::AppError;
use speakmatch_db::models::DbUser;

// 2025-03-10 18:00 UTC is 14:00 in America/New_York.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap()
}

fn db_user(id: Uuid, display_name: &str, email: &str) -> DbUser {
    DbUser {
        id,
        display_name: display_name.to_string(),
        email: email.to_string(),
        avatar_url: None,
        gender: None,
        created_at: Utc::now(),
    }
}

// Test wrapper mirroring the schedule-session handler: validate, persist,
// then resolve both profiles for the best-effort email. Returns the
// persisted row plus the email payload that would be dispatched (None when
// a profile lookup failed; the row is still created).
async fn schedule_session_wrapper(
    ctx: &mut TestContext,
    payload: ScheduleSessionRequest,
    now: DateTime<Utc>,
) -> Result<(DbScheduledRequest, Option<ScheduleEmail>), AppError> {
    let valid = timeclock::validate_submission(&payload, now)?;

    let expires_at = now + chrono::Duration::days(SCHEDULED_REQUEST_TTL_DAYS);
    let timezone_static: &'static str = Box::leak(payload.timezone.clone().into_boxed_str());
    let message_static: Option<&'static str> = payload
        .message
        .clone()
        .map(|m| Box::leak(m.into_boxed_str()) as &'static str);

    let row = ctx
        .scheduled_request_repo
        .create_scheduled_request(
            payload.sender_id,
            payload.receiver_id,
            valid.date,
            valid.time,
            valid.scheduled_at,
            timezone_static,
            message_static,
            expires_at,
        )
        .await?;

    let email = match (
        ctx.profile_repo.get_user_by_id(row.sender_id).await,
        ctx.profile_repo.get_user_by_id(row.receiver_id).await,
    ) {
        (Ok(Some(sender)), Ok(Some(receiver))) => Some(ScheduleEmail {
            receiver_email: receiver.email,
            receiver_name: receiver.display_name,
            sender_name: sender.display_name,
            scheduled_date: row.scheduled_date,
            scheduled_time: row.scheduled_time,
            timezone: row.timezone.clone(),
            message: row.message.clone(),
        }),
        // Lookup failures are logged; the request is already created.
        _ => None,
    };

    Ok((row, email))
}

fn tomorrow_nine_am(message: Option<String>) -> ScheduleSessionRequest {
    ScheduleSessionRequest {
        sender_id: Uuid::new_v4(),
        receiver_id: Uuid::new_v4(),
        date: Some(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()),
        hour: Some(9),
        minute: Some(0),
        timezone: "America/New_York".to_string(),
        message,
    }
}

#[tokio::test]
async fn test_schedule_end_to_end_with_max_length_message() {
    let mut ctx = TestContext::new();
    let message = "x".repeat(500);
    let payload = tomorrow_nine_am(Some(message.clone()));
    let sender_id = payload.sender_id;
    let receiver_id = payload.receiver_id;

    ctx.scheduled_request_repo
        .expect_create_scheduled_request()
        .times(1)
        .returning(
            move |sender_id,
                  receiver_id,
                  scheduled_date,
                  scheduled_time,
                  scheduled_at,
                  timezone,
                  message,
                  expires_at| {
                Ok(DbScheduledRequest {
                    id: Uuid::new_v4(),
                    sender_id,
                    receiver_id,
                    scheduled_date,
                    scheduled_time,
                    scheduled_at,
                    timezone: timezone.to_string(),
                    message: message.map(String::from),
                    status: "pending".to_string(),
                    created_at: now(),
                    expires_at,
                })
            },
        );

    ctx.profile_repo
        .expect_get_user_by_id()
        .with(predicate::eq(sender_id))
        .returning(|id| Ok(Some(db_user(id, "Maria Gonzalez", "maria@example.com"))));
    ctx.profile_repo
        .expect_get_user_by_id()
        .with(predicate::eq(receiver_id))
        .returning(|id| Ok(Some(db_user(id, "Chidi Okafor", "chidi@example.com"))));

    let (row, email) = schedule_session_wrapper(&mut ctx, payload, now()).await.unwrap();

    // The request persists as pending with the seven-day expiry.
    assert_eq!(row.status, "pending");
    assert_eq!(row.expires_at, now() + chrono::Duration::days(7));
    assert_eq!(row.timezone, "America/New_York");
    // 09:00 New York (EDT) on the 11th is 13:00 UTC.
    assert_eq!(
        row.scheduled_at,
        Utc.with_ymd_and_hms(2025, 3, 11, 13, 0, 0).unwrap()
    );

    // The email dispatch carries exactly the supplied fields.
    let email = email.unwrap();
    assert_eq!(email.receiver_email, "chidi@example.com");
    assert_eq!(email.receiver_name, "Chidi Okafor");
    assert_eq!(email.sender_name, "Maria Gonzalez");
    assert_eq!(
        email.scheduled_date,
        NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
    );
    assert_eq!(email.timezone, "America/New_York");
    assert_eq!(email.message.as_deref(), Some(message.as_str()));
}

#[tokio::test]
async fn test_schedule_same_day_earlier_time_rejected() {
    let mut ctx = TestContext::new();
    let mut payload = tomorrow_nine_am(None);
    payload.date = Some(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    payload.hour = Some(13);
    payload.minute = Some(59);

    ctx.scheduled_request_repo
        .expect_create_scheduled_request()
        .times(0);

    let result = schedule_session_wrapper(&mut ctx, payload, now()).await;
    match result.unwrap_err().0 {
        SpeakError::Schedule(errors) => {
            assert!(errors.time.is_some());
            assert!(errors.date.is_none());
        }
        e => panic!("Expected schedule error, got: {e:?}"),
    }
}

#[tokio::test]
async fn test_schedule_same_day_later_time_accepted() {
    let mut ctx = TestContext::new();
    let mut payload = tomorrow_nine_am(None);
    payload.date = Some(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    payload.hour = Some(14);
    payload.minute = Some(1);
    let sender_id = payload.sender_id;

    ctx.scheduled_request_repo
        .expect_create_scheduled_request()
        .times(1)
        .returning(
            move |sender_id,
                  receiver_id,
                  scheduled_date,
                  scheduled_time,
                  scheduled_at,
                  timezone,
                  message,
                  expires_at| {
                Ok(DbScheduledRequest {
                    id: Uuid::new_v4(),
                    sender_id,
                    receiver_id,
                    scheduled_date,
                    scheduled_time,
                    scheduled_at,
                    timezone: timezone.to_string(),
                    message: message.map(String::from),
                    status: "pending".to_string(),
                    created_at: now(),
                    expires_at,
                })
            },
        );

    // A failed profile lookup never rolls the request back.
    ctx.profile_repo
        .expect_get_user_by_id()
        .with(predicate::eq(sender_id))
        .returning(|_| Err(eyre::eyre!("profile store unavailable")));
    ctx.profile_repo
        .expect_get_user_by_id()
        .returning(|id| Ok(Some(db_user(id, "Chidi Okafor", "chidi@example.com"))));

    let (row, email) = schedule_session_wrapper(&mut ctx, payload, now()).await.unwrap();
    assert_eq!(row.status, "pending");
    assert!(email.is_none());
}

#[tokio::test]
async fn test_schedule_email_wire_format_is_camel_case() {
    let email = ScheduleEmail {
        receiver_email: "chidi@example.com".to_string(),
        receiver_name: "Chidi Okafor".to_string(),
        sender_name: "Maria Gonzalez".to_string(),
        scheduled_date: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
        scheduled_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        timezone: "America/New_York".to_string(),
        message: None,
    };

    let json = serde_json::to_string(&email).unwrap();
    assert!(json.contains("\"receiverEmail\""));
    assert!(json.contains("\"receiverName\""));
    assert!(json.contains("\"senderName\""));
    assert!(json.contains("\"scheduledDate\""));
    assert!(json.contains("\"scheduledTime\""));
    // Absent message is omitted entirely.
    assert!(!json.contains("message"));
}

use chrono::Utc;
use mockall::predicate;
use speakmatch_core::{
    errors::SpeakError,
    models::{
        presence::PresenceUpdate,
        room::{room_url, DEFAULT_ROOM_CAPACITY},
    },
    room_code,
};
use speakmatch_db::models::{DbParticipant, DbPresence, DbRoom, DbSpeakingRequest};
use speakmatch_realtime::NotificationCenter;
use uuid::Uuid;

use crate::test_utils::TestContext;
use speakmatch_api::middleware::error_handling::AppError;

fn pending_request(id: Uuid, sender_id: Uuid, receiver_id: Uuid) -> DbSpeakingRequest {
    DbSpeakingRequest {
        id,
        sender_id,
        receiver_id,
        status: "pending".to_string(),
        created_at: Utc::now(),
    }
}

// Test wrapper mirroring the accept flow: dismiss the alert first, re-fetch
// the request, create the room for the pair, then mark the request
// accepted.
async fn accept_request_wrapper(
    ctx: &mut TestContext,
    notifier: &NotificationCenter,
    id: Uuid,
) -> Result<String, AppError> {
    notifier.dismiss_speaking_request(id);

    let request = ctx
        .request_repo
        .get_request_by_id(id)
        .await?
        .ok_or_else(|| {
            AppError(SpeakError::NotFound(
                "Speaking request no longer exists".to_string(),
            ))
        })?;

    let code = room_code::generate();
    let code_static: &'static str = Box::leak(code.clone().into_boxed_str());
    if ctx
        .room_repo
        .get_active_room_by_code(code_static)
        .await?
        .is_some()
    {
        return Err(AppError(SpeakError::Conflict(
            "Could not allocate a unique room code".to_string(),
        )));
    }

    let room = ctx
        .room_repo
        .create_room(code_static, request.sender_id, DEFAULT_ROOM_CAPACITY)
        .await?;

    if let Err(e) = ctx
        .participant_repo
        .add_room_pair(room.id, request.sender_id, request.receiver_id)
        .await
    {
        let _ = ctx.room_repo.delete_room(room.id).await;
        return Err(AppError(SpeakError::Database(e)));
    }

    let now = Utc::now();
    let _ = ctx
        .presence_repo
        .upsert_presence(request.sender_id, PresenceUpdate::entered_room(&code, now))
        .await;
    let _ = ctx
        .presence_repo
        .upsert_presence(request.receiver_id, PresenceUpdate::entered_room(&code, now))
        .await;

    ctx.request_repo.update_request_status(id, "accepted").await?;

    Ok(code)
}

async fn decline_request_wrapper(
    ctx: &mut TestContext,
    notifier: &NotificationCenter,
    id: Uuid,
) -> Result<(), AppError> {
    notifier.dismiss_speaking_request(id);

    let affected = ctx.request_repo.update_request_status(id, "rejected").await?;
    if affected == 0 {
        return Err(AppError(SpeakError::NotFound(
            "Speaking request no longer exists".to_string(),
        )));
    }

    Ok(())
}

#[tokio::test]
async fn test_accept_creates_room_and_marks_accepted() {
    let mut ctx = TestContext::new();
    let notifier = NotificationCenter::new();
    let request_id = Uuid::new_v4();
    let sender = Uuid::new_v4();
    let receiver = Uuid::new_v4();
    let room_id = Uuid::new_v4();

    notifier.show_speaking_request("Maria Gonzalez", request_id, receiver);

    ctx.request_repo
        .expect_get_request_by_id()
        .with(predicate::eq(request_id))
        .returning(move |id| Ok(Some(pending_request(id, sender, receiver))));

    ctx.room_repo
        .expect_get_active_room_by_code()
        .returning(|_| Ok(None));

    ctx.room_repo
        .expect_create_room()
        .times(1)
        .returning(move |code, created_by, capacity| {
            Ok(DbRoom {
                id: room_id,
                code: code.to_string(),
                created_by,
                status: "active".to_string(),
                room_type: "instant".to_string(),
                capacity,
                media_channel: code.to_string(),
                created_at: Utc::now(),
            })
        });

    ctx.participant_repo
        .expect_add_room_pair()
        .with(
            predicate::eq(room_id),
            predicate::eq(sender),
            predicate::eq(receiver),
        )
        .times(1)
        .returning(|room_id, creator, participant| {
            let now = Utc::now();
            Ok(vec![
                DbParticipant {
                    id: Uuid::new_v4(),
                    room_id,
                    user_id: creator,
                    role: "creator".to_string(),
                    online: true,
                    joined_at: now,
                    left_at: None,
                },
                DbParticipant {
                    id: Uuid::new_v4(),
                    room_id,
                    user_id: participant,
                    role: "participant".to_string(),
                    online: true,
                    joined_at: now,
                    left_at: None,
                },
            ])
        });

    // Presence for both users ends up in-room with the new code.
    ctx.presence_repo
        .expect_upsert_presence()
        .withf(|_, update| update.in_room && update.room_code.is_some())
        .times(2)
        .returning(|user_id, update| {
            Ok(DbPresence {
                user_id,
                is_online: update.is_online,
                last_seen: Utc::now(),
                in_room: update.in_room,
                room_code: update.room_code.clone(),
                room_entered_at: update.room_entered_at,
            })
        });

    ctx.request_repo
        .expect_update_request_status()
        .with(predicate::eq(request_id), predicate::eq("accepted"))
        .times(1)
        .returning(|_, _| Ok(1));

    let code = accept_request_wrapper(&mut ctx, &notifier, request_id)
        .await
        .unwrap();

    assert!(room_code::is_valid(&code));
    assert_eq!(room_url(&code), format!("/speaking/room/{code}"));
    // The alert was cleared as the first effect.
    assert!(!notifier.is_active(request_id));
}

#[tokio::test]
async fn test_accept_missing_request_fails() {
    let mut ctx = TestContext::new();
    let notifier = NotificationCenter::new();
    let request_id = Uuid::new_v4();

    ctx.request_repo
        .expect_get_request_by_id()
        .returning(|_| Ok(None));

    ctx.room_repo.expect_create_room().times(0);
    ctx.request_repo.expect_update_request_status().times(0);

    let result = accept_request_wrapper(&mut ctx, &notifier, request_id).await;
    match result.unwrap_err().0 {
        SpeakError::NotFound(msg) => assert!(msg.contains("no longer exists")),
        e => panic!("Expected not-found error, got: {e:?}"),
    }
}

#[tokio::test]
async fn test_accept_room_failure_leaves_request_untouched() {
    let mut ctx = TestContext::new();
    let notifier = NotificationCenter::new();
    let request_id = Uuid::new_v4();
    let sender = Uuid::new_v4();
    let receiver = Uuid::new_v4();
    let room_id = Uuid::new_v4();

    ctx.request_repo
        .expect_get_request_by_id()
        .returning(move |id| Ok(Some(pending_request(id, sender, receiver))));

    ctx.room_repo
        .expect_get_active_room_by_code()
        .returning(|_| Ok(None));

    ctx.room_repo
        .expect_create_room()
        .returning(move |code, created_by, capacity| {
            Ok(DbRoom {
                id: room_id,
                code: code.to_string(),
                created_by,
                status: "active".to_string(),
                room_type: "instant".to_string(),
                capacity,
                media_channel: code.to_string(),
                created_at: Utc::now(),
            })
        });

    ctx.participant_repo
        .expect_add_room_pair()
        .returning(|_, _, _| Err(eyre::eyre!("participant insert failed")));

    ctx.room_repo
        .expect_delete_room()
        .with(predicate::eq(room_id))
        .times(1)
        .returning(|_| Ok(()));

    // The request's status is never mutated on a failed room creation.
    ctx.request_repo.expect_update_request_status().times(0);

    let result = accept_request_wrapper(&mut ctx, &notifier, request_id).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_decline_marks_rejected() {
    let mut ctx = TestContext::new();
    let notifier = NotificationCenter::new();
    let request_id = Uuid::new_v4();

    notifier.show_speaking_request("Maria", request_id, Uuid::new_v4());

    ctx.request_repo
        .expect_update_request_status()
        .with(predicate::eq(request_id), predicate::eq("rejected"))
        .times(1)
        .returning(|_, _| Ok(1));

    decline_request_wrapper(&mut ctx, &notifier, request_id)
        .await
        .unwrap();
    assert!(!notifier.is_active(request_id));
}

#[tokio::test]
async fn test_decline_missing_request_fails() {
    let mut ctx = TestContext::new();
    let notifier = NotificationCenter::new();

    ctx.request_repo
        .expect_update_request_status()
        .returning(|_, _| Ok(0));

    let result = decline_request_wrapper(&mut ctx, &notifier, Uuid::new_v4()).await;
    match result.unwrap_err().0 {
        SpeakError::NotFound(_) => {}
        e => panic!("Expected not-found error, got: {e:?}"),
    }
}

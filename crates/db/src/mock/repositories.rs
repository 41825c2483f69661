use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mockall::mock;
use speakmatch_core::models::presence::PresenceUpdate;
use uuid::Uuid;

use crate::models::{
    DbParticipant, DbPresence, DbRoom, DbRoomMember, DbScheduledRequest, DbSpeakingRequest,
    DbUser,
};

// Mock repositories for testing
mock! {
    pub RoomRepo {
        pub async fn create_room(
            &self,
            code: &'static str,
            created_by: Uuid,
            capacity: i32,
        ) -> eyre::Result<DbRoom>;

        pub async fn get_active_room_by_code(
            &self,
            code: &'static str,
        ) -> eyre::Result<Option<DbRoom>>;

        pub async fn get_room_by_code(
            &self,
            code: &'static str,
        ) -> eyre::Result<Option<DbRoom>>;

        pub async fn get_room_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbRoom>>;

        pub async fn delete_room(&self, id: Uuid) -> eyre::Result<()>;
    }
}

mock! {
    pub ParticipantRepo {
        pub async fn add_room_pair(
            &self,
            room_id: Uuid,
            creator_id: Uuid,
            participant_id: Uuid,
        ) -> eyre::Result<Vec<DbParticipant>>;

        pub async fn add_participant(
            &self,
            room_id: Uuid,
            user_id: Uuid,
        ) -> eyre::Result<DbParticipant>;

        pub async fn count_open_participants(&self, room_id: Uuid) -> eyre::Result<i64>;

        pub async fn close_open_participant(
            &self,
            room_id: Uuid,
            user_id: Uuid,
            left_at: DateTime<Utc>,
        ) -> eyre::Result<u64>;

        pub async fn get_open_participants_with_profiles(
            &self,
            room_id: Uuid,
        ) -> eyre::Result<Vec<DbRoomMember>>;
    }
}

mock! {
    pub PresenceRepo {
        pub async fn upsert_presence(
            &self,
            user_id: Uuid,
            update: PresenceUpdate,
        ) -> eyre::Result<DbPresence>;

        pub async fn get_presence(&self, user_id: Uuid) -> eyre::Result<Option<DbPresence>>;
    }
}

mock! {
    pub RequestRepo {
        pub async fn create_request(
            &self,
            sender_id: Uuid,
            receiver_id: Uuid,
        ) -> eyre::Result<DbSpeakingRequest>;

        pub async fn get_request_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbSpeakingRequest>>;

        pub async fn update_request_status(
            &self,
            id: Uuid,
            status: &'static str,
        ) -> eyre::Result<u64>;

        pub async fn list_pending_for_receiver(
            &self,
            receiver_id: Uuid,
        ) -> eyre::Result<Vec<DbSpeakingRequest>>;
    }
}

mock! {
    pub ScheduledRequestRepo {
        pub async fn create_scheduled_request(
            &self,
            sender_id: Uuid,
            receiver_id: Uuid,
            scheduled_date: NaiveDate,
            scheduled_time: NaiveTime,
            scheduled_at: DateTime<Utc>,
            timezone: &'static str,
            message: Option<&'static str>,
            expires_at: DateTime<Utc>,
        ) -> eyre::Result<DbScheduledRequest>;
    }
}

mock! {
    pub ProfileRepo {
        pub async fn get_user_by_id(&self, id: Uuid) -> eyre::Result<Option<DbUser>>;
    }
}

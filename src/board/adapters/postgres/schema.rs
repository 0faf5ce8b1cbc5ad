//! Diesel schema for board persistence.

diesel::table! {
    /// Task cards.
    tasks (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Task title.
        title -> Text,
        /// Free-text description.
        description -> Text,
        /// Board column.
        #[max_length = 32]
        status -> Varchar,
        /// Urgency.
        #[max_length = 32]
        priority -> Varchar,
        /// Owning agent.
        #[max_length = 100]
        agent -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Board grouping key.
        #[max_length = 100]
        board -> Varchar,
        /// Provenance file.
        source_file -> Nullable<Text>,
        /// Provenance reference.
        source_ref -> Nullable<Text>,
        /// Agent currently working on the task.
        #[max_length = 100]
        working_agent -> Nullable<Varchar>,
        /// Bound agent session.
        agent_session_key -> Nullable<Text>,
    }
}

diesel::table! {
    /// Task comments.
    comments (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Owning task.
        task_id -> Int8,
        /// Author.
        #[max_length = 100]
        agent -> Varchar,
        /// Body.
        content -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Questions, completion notices and blockers.
    action_items (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Owning task.
        task_id -> Int8,
        /// Originating comment.
        comment_id -> Nullable<Int8>,
        /// Author.
        #[max_length = 100]
        agent -> Varchar,
        /// Item text.
        content -> Text,
        /// Item kind.
        #[max_length = 32]
        item_type -> Varchar,
        /// Resolution flag.
        resolved -> Bool,
        /// Archive flag.
        archived -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Resolution timestamp.
        resolved_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only audit trail.
    activity_log (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Referenced task.
        task_id -> Int8,
        /// Kind of change.
        #[max_length = 32]
        action -> Varchar,
        /// Acting agent.
        #[max_length = 100]
        agent -> Nullable<Varchar>,
        /// Human-readable detail.
        details -> Text,
        /// Time of the change.
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Command-bar chat history.
    chat_messages (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Owning session.
        #[max_length = 255]
        session_key -> Varchar,
        /// Author side.
        #[max_length = 16]
        role -> Varchar,
        /// Body.
        content -> Text,
        /// Structured attachments.
        attachments -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sessions hidden from listings after deletion.
    deleted_sessions (session_key) {
        /// Deleted session key.
        #[max_length = 255]
        session_key -> Varchar,
        /// Deletion timestamp.
        deleted_at -> Timestamptz,
    }
}

diesel::joinable!(comments -> tasks (task_id));
diesel::joinable!(action_items -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(
    tasks,
    comments,
    action_items,
    activity_log,
    chat_messages,
    deleted_sessions,
);

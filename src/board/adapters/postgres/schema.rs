//! Diesel schema for board persistence.

diesel::table! {
    /// Task records, authoritative for status and order.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning parent group.
        parent_group_id -> Uuid,
        /// Task name.
        #[max_length = 255]
        name -> Varchar,
        /// Workflow status.
        #[max_length = 32]
        status -> Varchar,
        /// Order within the status group.
        order_key -> Int4,
        /// Optional category.
        category -> Nullable<Text>,
        /// Priority.
        #[max_length = 16]
        priority -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Denormalized board per parent group.
    board_configs (parent_group_id) {
        /// Owning parent group.
        parent_group_id -> Uuid,
        /// Ordered column array including card references.
        #[sql_name = "columns"]
        layout -> Jsonb,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Derived activity status and the parent group's write revision.
    activities (id) {
        /// Parent group identifier.
        id -> Uuid,
        /// Rolled-up activity status.
        #[max_length = 16]
        status -> Varchar,
        /// Revision bumped by every commit.
        revision -> Int8,
        /// Last status change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tasks, board_configs, activities);

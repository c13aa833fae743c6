//! SQL query constants
//!
//! Contains all SQL queries used against the `projects` table.

/// Every stored filename, whatever the stage
pub const LIST_FILENAMES: &str = r#"
    SELECT filename
    FROM projects
    WHERE filename IS NOT NULL
    ORDER BY id
"#;

/// Projects in one stage, filtered by merge request state
pub const LIST_BY_STAGE: &str = r#"
    SELECT
        filename,
        COALESCE(title, '') AS title,
        COALESCE(gitlab_url, '') AS gitlab_url,
        gitlab_state,
        state,
        COALESCE(percentage_funded, 0)::numeric AS percentage_funded,
        COALESCE(target_amount, 0)::numeric AS target_amount,
        COALESCE(amount_received, 0)::numeric AS amount_received,
        COALESCE(gitlab_username, '') AS gitlab_username,
        gitlab_created_at,
        COALESCE(payment_id::text, '') AS payment_id
    FROM projects
    WHERE gitlab_state = $1
        AND state = $2
    ORDER BY id
"#;

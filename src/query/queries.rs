/// Filtered listing page. Every filter is optional; the status filter is
/// matched against the effective status, so `ended` finds live listings
/// whose end time has passed and `live` excludes them.
pub const LIST_LISTINGS: &str = r#"
    SELECT * FROM listings
    WHERE ($1::text IS NULL OR
           (CASE WHEN status = 'live' AND end_time <= $6 THEN 'ended' ELSE status::text END) = $1)
      AND ($2::bigint IS NULL OR category_id = $2)
      AND ($3::boolean IS NULL OR featured = $3)
      AND ($4::bigint IS NULL OR seller_id = $4)
      AND ($5::text IS NULL OR title ILIKE '%' || $5 || '%' OR description ILIKE '%' || $5 || '%')
    ORDER BY created_at DESC
    LIMIT $7 OFFSET $8
"#;

/// Total for the same filter, for pagination.
pub const COUNT_LISTINGS: &str = r#"
    SELECT COUNT(*) FROM listings
    WHERE ($1::text IS NULL OR
           (CASE WHEN status = 'live' AND end_time <= $6 THEN 'ended' ELSE status::text END) = $1)
      AND ($2::bigint IS NULL OR category_id = $2)
      AND ($3::boolean IS NULL OR featured = $3)
      AND ($4::bigint IS NULL OR seller_id = $4)
      AND ($5::text IS NULL OR title ILIKE '%' || $5 || '%' OR description ILIKE '%' || $5 || '%')
"#;

/// Single listing lookup.
pub const GET_LISTING: &str = "SELECT * FROM listings WHERE id = $1";

/// Raw per-status counts; the fold into dashboard buckets happens in the
/// handler.
pub const STATUS_COUNTS: &str = r#"
    SELECT status::text AS status, COUNT(*) AS total
    FROM listings
    GROUP BY status
"#;

use rusqlite::Connection;

/// Initialize the database schema.
///
/// The uniqueness constraints here are load-bearing: `order_code` and
/// `license_key` collisions surface as constraint violations that the
/// allocation code retries, and UNIQUE(license_key, machine_id) makes
/// re-recording an activation idempotent. Orders and licenses are never
/// deleted; status columns are the only mutable state.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Purchase orders. Status is one-directional:
        -- pending -> completed | cancelled, enforced by guarded UPDATEs.
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_code INTEGER NOT NULL UNIQUE,
            customer_email TEXT,
            customer_phone TEXT,
            package_tier TEXT NOT NULL,
            duration_days INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'completed', 'cancelled')),
            payment_link_id TEXT,
            transaction_ref TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
        CREATE INDEX IF NOT EXISTS idx_orders_created ON orders(created_at DESC);

        -- Issued licenses. bound_machine_id starts NULL and is set exactly
        -- once by a compare-and-set at first activation.
        CREATE TABLE IF NOT EXISTS licenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            license_key TEXT NOT NULL UNIQUE,
            order_id INTEGER NOT NULL REFERENCES orders(id),
            package_tier TEXT NOT NULL,
            duration_days INTEGER NOT NULL,
            activated_at INTEGER,
            expires_at INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'revoked')),
            bound_machine_id TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_licenses_order ON licenses(order_id);

        -- Per-machine activation audit trail. The binding rule itself lives
        -- on licenses.bound_machine_id; this table records when each
        -- (license, machine) pair first activated.
        CREATE TABLE IF NOT EXISTS activations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            license_key TEXT NOT NULL REFERENCES licenses(license_key),
            machine_id TEXT NOT NULL,
            activated_at INTEGER NOT NULL,
            UNIQUE(license_key, machine_id)
        );
        CREATE INDEX IF NOT EXISTS idx_activations_key ON activations(license_key);
        "#,
    )?;
    Ok(())
}

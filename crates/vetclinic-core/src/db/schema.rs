//! SQLite schema definition.

/// Complete database schema for vetclinic.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Clients
-- ============================================================================

CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    clinic_id TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE' CHECK (status IN ('ACTIVE', 'ARCHIVED')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_clients_clinic ON clients(clinic_id);

-- ============================================================================
-- Animals
-- ============================================================================

CREATE TABLE IF NOT EXISTS animals (
    id TEXT PRIMARY KEY,
    clinic_id TEXT NOT NULL,
    name TEXT NOT NULL,
    species TEXT NOT NULL,
    sex TEXT NOT NULL,
    reproductive_status TEXT NOT NULL,
    is_mixed_breed INTEGER NOT NULL DEFAULT 0,
    breed_name TEXT,
    birth_date TEXT,                             -- YYYY-MM-DD
    color TEXT,
    photo_url TEXT,
    microchip_number TEXT,                       -- copied out of identification for lookups
    identification TEXT NOT NULL,                -- JSON Identification
    life_cycle TEXT NOT NULL,                    -- JSON LifeCycle
    transfer TEXT NOT NULL,                      -- JSON Transfer
    auxiliary_contact TEXT,                      -- JSON AuxiliaryContact, NULL if absent
    status TEXT NOT NULL CHECK (status IN ('ACTIVE', 'ARCHIVED')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_animals_clinic ON animals(clinic_id);
CREATE INDEX IF NOT EXISTS idx_animals_microchip ON animals(clinic_id, microchip_number);

-- ============================================================================
-- Ownership ledger (ordered, history retained)
-- ============================================================================

CREATE TABLE IF NOT EXISTS animal_ownerships (
    animal_id TEXT NOT NULL REFERENCES animals(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    client_id TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('PRIMARY', 'SECONDARY')),
    status TEXT NOT NULL CHECK (status IN ('ACTIVE', 'ENDED')),
    started_at TEXT NOT NULL,
    ended_at TEXT,
    PRIMARY KEY (animal_id, position)
);

CREATE INDEX IF NOT EXISTS idx_ownerships_client ON animal_ownerships(client_id, status);

-- ============================================================================
-- Domain event outbox (append-only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS domain_events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    aggregate_id TEXT NOT NULL,
    clinic_id TEXT NOT NULL,
    event_type TEXT NOT NULL,
    payload TEXT NOT NULL,                       -- JSON DomainEvent
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_aggregate ON domain_events(aggregate_id);

CREATE TRIGGER IF NOT EXISTS domain_events_no_update BEFORE UPDATE ON domain_events
BEGIN
    SELECT RAISE(ABORT, 'Domain events are append-only');
END;
"#;

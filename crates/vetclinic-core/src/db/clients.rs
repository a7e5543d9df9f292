//! Client database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{format_timestamp, parse_column, parse_timestamp, Database, DbError, DbResult};
use crate::models::{Client, ClientStatus, DomainEvent};

impl Database {
    /// Insert a new client.
    pub fn insert_client(&self, client: &Client) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO clients (
                id, clinic_id, first_name, last_name, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                client.id,
                client.clinic_id,
                client.first_name,
                client.last_name,
                client.status.as_str(),
                format_timestamp(client.created_at),
                format_timestamp(client.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Update an existing client, failing with `NotFound` if it is unknown.
    pub fn update_client(&self, client: &Client) -> DbResult<()> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE clients SET
                first_name = ?2,
                last_name = ?3,
                status = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
            params![
                client.id,
                client.first_name,
                client.last_name,
                client.status.as_str(),
                format_timestamp(client.updated_at),
            ],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("client {}", client.id)));
        }
        Ok(())
    }

    /// Update a client and append its recorded events in one transaction.
    pub fn save_client_with_events(
        &self,
        client: &Client,
        events: &[DomainEvent],
        recorded_at: DateTime<Utc>,
    ) -> DbResult<()> {
        self.write(|| {
            self.update_client(client)?;
            self.insert_events(events, recorded_at)
        })
    }

    /// Get a client of a clinic.
    pub fn get_client(&self, clinic_id: &str, client_id: &str) -> DbResult<Option<Client>> {
        self.conn
            .query_row(
                r#"
                SELECT id, clinic_id, first_name, last_name, status, created_at, updated_at
                FROM clients
                WHERE id = ?1 AND clinic_id = ?2
                "#,
                [client_id, clinic_id],
                |row| {
                    Ok(ClientRow {
                        id: row.get(0)?,
                        clinic_id: row.get(1)?,
                        first_name: row.get(2)?,
                        last_name: row.get(3)?,
                        status: row.get(4)?,
                        created_at: row.get(5)?,
                        updated_at: row.get(6)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }
}

/// Intermediate row struct for database mapping.
struct ClientRow {
    id: String,
    clinic_id: String,
    first_name: String,
    last_name: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ClientRow> for Client {
    type Error = DbError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        Ok(Client::reconstitute(
            row.id,
            row.clinic_id,
            row.first_name,
            row.last_name,
            parse_column(&row.status, ClientStatus::parse, "client status")?,
            parse_timestamp(&row.created_at)?,
            parse_timestamp(&row.updated_at)?,
        ))
    }
}

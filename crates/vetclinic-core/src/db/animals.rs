//! Animal repository.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{
    format_timestamp, parse_column, parse_date, parse_timestamp, Database, DbError, DbResult,
};
use crate::models::{
    Animal, AnimalIdentity, AnimalSnapshot, AnimalStatus, DomainEvent, Ownership, OwnershipRole,
    OwnershipStatus, ReproductiveStatus, Sex, Species,
};

const ANIMAL_COLUMNS: &str = r#"
    id, clinic_id, name, species, sex, reproductive_status, is_mixed_breed,
    breed_name, birth_date, color, photo_url, identification, life_cycle,
    transfer, auxiliary_contact, status, created_at, updated_at
"#;

impl Database {
    /// Insert or update an animal and rewrite its ownership ledger, in one
    /// transaction.
    pub fn save_animal(&self, animal: &Animal) -> DbResult<()> {
        self.write(|| self.write_animal(animal))
    }

    /// Save an animal together with its recorded events. Either the row, the
    /// ledger and every outbox entry are stored, or none of them.
    pub fn save_animal_with_events(
        &self,
        animal: &Animal,
        events: &[DomainEvent],
        recorded_at: DateTime<Utc>,
    ) -> DbResult<()> {
        self.write(|| {
            self.write_animal(animal)?;
            self.insert_events(events, recorded_at)
        })
    }

    fn write_animal(&self, animal: &Animal) -> DbResult<()> {
        let identity = animal.identity();
        let identification_json = serde_json::to_string(animal.identification())?;
        let life_cycle_json = serde_json::to_string(animal.life_cycle())?;
        let transfer_json = serde_json::to_string(animal.transfer())?;
        let auxiliary_contact_json = animal
            .auxiliary_contact()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            r#"
            INSERT INTO animals (
                id, clinic_id, name, species, sex, reproductive_status, is_mixed_breed,
                breed_name, birth_date, color, photo_url, microchip_number, identification,
                life_cycle, transfer, auxiliary_contact, status, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19
            )
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                species = excluded.species,
                sex = excluded.sex,
                reproductive_status = excluded.reproductive_status,
                is_mixed_breed = excluded.is_mixed_breed,
                breed_name = excluded.breed_name,
                birth_date = excluded.birth_date,
                color = excluded.color,
                photo_url = excluded.photo_url,
                microchip_number = excluded.microchip_number,
                identification = excluded.identification,
                life_cycle = excluded.life_cycle,
                transfer = excluded.transfer,
                auxiliary_contact = excluded.auxiliary_contact,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
            params![
                animal.id(),
                animal.clinic_id(),
                identity.name,
                identity.species.as_str(),
                identity.sex.as_str(),
                identity.reproductive_status.as_str(),
                identity.is_mixed_breed,
                identity.breed_name,
                identity.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
                identity.color,
                identity.photo_url,
                animal.identification().microchip(),
                identification_json,
                life_cycle_json,
                transfer_json,
                auxiliary_contact_json,
                animal.status().as_str(),
                format_timestamp(animal.created_at()),
                format_timestamp(animal.updated_at()),
            ],
        )?;

        self.conn.execute(
            "DELETE FROM animal_ownerships WHERE animal_id = ?",
            [animal.id()],
        )?;
        {
            let mut stmt = self.conn.prepare(
                r#"
                INSERT INTO animal_ownerships (
                    animal_id, position, client_id, role, status, started_at, ended_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;
            for (position, ownership) in animal.ownerships().iter().enumerate() {
                stmt.execute(params![
                    animal.id(),
                    position as i64,
                    ownership.client_id(),
                    ownership.role().as_str(),
                    ownership.status().as_str(),
                    format_timestamp(ownership.started_at()),
                    ownership.ended_at().map(format_timestamp),
                ])?;
            }
        }

        Ok(())
    }

    /// Find an animal of a clinic.
    pub fn find_animal(&self, clinic_id: &str, animal_id: &str) -> DbResult<Option<Animal>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM animals WHERE id = ?1 AND clinic_id = ?2",
                    ANIMAL_COLUMNS
                ),
                [animal_id, clinic_id],
                AnimalRow::from_row,
            )
            .optional()?;

        row.map(|row| self.assemble(row)).transpose()
    }

    /// Get an animal of a clinic, failing with `NotFound` if absent.
    pub fn get_animal(&self, clinic_id: &str, animal_id: &str) -> DbResult<Animal> {
        self.find_animal(clinic_id, animal_id)?
            .ok_or_else(|| DbError::NotFound(format!("animal {}", animal_id)))
    }

    /// Check whether a microchip number is already used in a clinic.
    pub fn exists_by_microchip(
        &self,
        clinic_id: &str,
        microchip_number: &str,
        except_animal_id: Option<&str>,
    ) -> DbResult<bool> {
        let exists = self.conn.query_row(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM animals
                WHERE clinic_id = ?1
                  AND microchip_number = ?2
                  AND (?3 IS NULL OR id <> ?3)
            )
            "#,
            params![clinic_id, microchip_number.trim(), except_animal_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Active animals of a clinic where the client holds an active ownership.
    pub fn find_by_active_owner(&self, clinic_id: &str, client_id: &str) -> DbResult<Vec<Animal>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM animals a
            WHERE a.clinic_id = ?1
              AND a.status = 'ACTIVE'
              AND EXISTS (
                  SELECT 1 FROM animal_ownerships o
                  WHERE o.animal_id = a.id AND o.client_id = ?2 AND o.status = 'ACTIVE'
              )
            ORDER BY a.id
            "#,
            ANIMAL_COLUMNS
        ))?;

        let rows = stmt.query_map([clinic_id, client_id], AnimalRow::from_row)?;

        let mut animals = Vec::new();
        for row in rows {
            animals.push(self.assemble(row?)?);
        }
        Ok(animals)
    }

    /// List all animals of a clinic, by name.
    pub fn list_animals(&self, clinic_id: &str) -> DbResult<Vec<Animal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM animals WHERE clinic_id = ? ORDER BY name, id",
            ANIMAL_COLUMNS
        ))?;

        let rows = stmt.query_map([clinic_id], AnimalRow::from_row)?;

        let mut animals = Vec::new();
        for row in rows {
            animals.push(self.assemble(row?)?);
        }
        Ok(animals)
    }

    fn load_ownerships(&self, animal_id: &str) -> DbResult<Vec<Ownership>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT client_id, role, status, started_at, ended_at
            FROM animal_ownerships
            WHERE animal_id = ?
            ORDER BY position
            "#,
        )?;

        let rows = stmt.query_map([animal_id], |row| {
            Ok(OwnershipRow {
                client_id: row.get(0)?,
                role: row.get(1)?,
                status: row.get(2)?,
                started_at: row.get(3)?,
                ended_at: row.get(4)?,
            })
        })?;

        let mut ownerships = Vec::new();
        for row in rows {
            ownerships.push(row?.try_into()?);
        }
        Ok(ownerships)
    }

    fn assemble(&self, row: AnimalRow) -> DbResult<Animal> {
        let ownerships = self.load_ownerships(&row.id)?;
        row.into_animal(ownerships)
    }
}

/// Intermediate row struct for database mapping.
struct AnimalRow {
    id: String,
    clinic_id: String,
    name: String,
    species: String,
    sex: String,
    reproductive_status: String,
    is_mixed_breed: bool,
    breed_name: Option<String>,
    birth_date: Option<String>,
    color: Option<String>,
    photo_url: Option<String>,
    identification: String,
    life_cycle: String,
    transfer: String,
    auxiliary_contact: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl AnimalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            clinic_id: row.get(1)?,
            name: row.get(2)?,
            species: row.get(3)?,
            sex: row.get(4)?,
            reproductive_status: row.get(5)?,
            is_mixed_breed: row.get(6)?,
            breed_name: row.get(7)?,
            birth_date: row.get(8)?,
            color: row.get(9)?,
            photo_url: row.get(10)?,
            identification: row.get(11)?,
            life_cycle: row.get(12)?,
            transfer: row.get(13)?,
            auxiliary_contact: row.get(14)?,
            status: row.get(15)?,
            created_at: row.get(16)?,
            updated_at: row.get(17)?,
        })
    }

    fn into_animal(self, ownerships: Vec<Ownership>) -> DbResult<Animal> {
        let identity = AnimalIdentity {
            name: self.name,
            species: parse_column(&self.species, Species::parse, "species")?,
            sex: parse_column(&self.sex, Sex::parse, "sex")?,
            reproductive_status: parse_column(
                &self.reproductive_status,
                ReproductiveStatus::parse,
                "reproductive status",
            )?,
            is_mixed_breed: self.is_mixed_breed,
            breed_name: self.breed_name,
            birth_date: self.birth_date.as_deref().map(parse_date).transpose()?,
            color: self.color,
            photo_url: self.photo_url,
        };

        Ok(Animal::reconstitute(AnimalSnapshot {
            id: self.id,
            clinic_id: self.clinic_id,
            identity,
            identification: serde_json::from_str(&self.identification)?,
            life_cycle: serde_json::from_str(&self.life_cycle)?,
            transfer: serde_json::from_str(&self.transfer)?,
            auxiliary_contact: self
                .auxiliary_contact
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            status: parse_column(&self.status, AnimalStatus::parse, "animal status")?,
            ownerships,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        }))
    }
}

struct OwnershipRow {
    client_id: String,
    role: String,
    status: String,
    started_at: String,
    ended_at: Option<String>,
}

impl TryFrom<OwnershipRow> for Ownership {
    type Error = DbError;

    fn try_from(row: OwnershipRow) -> Result<Self, Self::Error> {
        Ok(Ownership::restore(
            row.client_id,
            parse_column(&row.role, OwnershipRole::parse, "ownership role")?,
            parse_column(&row.status, OwnershipStatus::parse, "ownership status")?,
            parse_timestamp(&row.started_at)?,
            row.ended_at.as_deref().map(parse_timestamp).transpose()?,
        ))
    }
}

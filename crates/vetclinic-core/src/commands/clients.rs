//! Client command handlers and the client-archived consumer.

use tracing::{debug, info};

use super::{ClinicCommands, CommandError, CommandResult};
use crate::clock::Clock;
use crate::db::DbError;
use crate::models::{Animal, Client};

impl<'a, C: Clock> ClinicCommands<'a, C> {
    /// Register a new client in a clinic.
    pub fn register_client(
        &self,
        clinic_id: &str,
        first_name: &str,
        last_name: &str,
    ) -> CommandResult<Client> {
        let (first_name, last_name) = (first_name.trim(), last_name.trim());
        if first_name.is_empty() || last_name.is_empty() {
            return Err(CommandError::InvalidInput(
                "Client first and last name are required".into(),
            ));
        }

        let client = Client::register(
            uuid::Uuid::new_v4().to_string(),
            clinic_id.to_string(),
            first_name.to_string(),
            last_name.to_string(),
            self.clock.now(),
        );
        self.db.insert_client(&client)?;

        info!(client_id = %client.id, clinic_id, "client registered");
        Ok(client)
    }

    /// Archive a client and resolve ownership of every animal it owned.
    ///
    /// The client update, its `ClientArchived` event and every animal change
    /// commit together. On error nothing is stored and the command can be
    /// retried. Returns the animals whose ownership changed.
    pub fn archive_client(&self, clinic_id: &str, client_id: &str) -> CommandResult<Vec<Animal>> {
        let mut client = self
            .db
            .get_client(clinic_id, client_id)?
            .ok_or_else(|| CommandError::UnknownClient(client_id.to_string()))?;

        let now = self.clock.now();
        client.archive(now)?;

        let tx = self.db.transaction()?;
        let events = client.pull_domain_events();
        self.db.save_client_with_events(&client, &events, now)?;
        let resolved = self.resolve_archived_client(clinic_id, client_id)?;
        tx.commit().map_err(DbError::from)?;

        info!(client_id, clinic_id, animals = resolved.len(), "client archived");
        Ok(resolved)
    }

    /// Consumer for `ClientArchived`. Safe to run again for the same client:
    /// animals already resolved no longer list it as an active owner. All
    /// animals commit together.
    pub fn handle_client_archived(
        &self,
        clinic_id: &str,
        client_id: &str,
    ) -> CommandResult<Vec<Animal>> {
        let tx = self.db.transaction()?;
        let resolved = self.resolve_archived_client(clinic_id, client_id)?;
        tx.commit().map_err(DbError::from)?;
        Ok(resolved)
    }

    fn resolve_archived_client(
        &self,
        clinic_id: &str,
        client_id: &str,
    ) -> CommandResult<Vec<Animal>> {
        let animals = self.db.find_by_active_owner(clinic_id, client_id)?;
        if animals.is_empty() {
            debug!(client_id, clinic_id, "no animals to resolve");
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        let mut resolved = Vec::with_capacity(animals.len());
        for mut animal in animals {
            animal.resolve_ownership_for_archived_client(client_id, now)?;
            animal.ensure_invariants()?;
            self.commit_animal(&mut animal)?;

            info!(
                animal_id = %animal.id(),
                client_id,
                primary_owner = animal.primary_owner().map(|o| o.client_id()).unwrap_or("-"),
                archived = animal.is_archived(),
                "ownership resolved for archived client"
            );
            resolved.push(animal);
        }
        Ok(resolved)
    }
}

use crate::database::entities::{
    ServiceEnvironmentRecord, environments, service_environments, services,
};
use crate::database::{DatabaseError, DatabaseResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Lookups of billing targets by their various external identifiers
pub struct ServiceEnvironmentsDao {
    db: DatabaseConnection,
}

impl ServiceEnvironmentsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i32) -> DatabaseResult<Option<ServiceEnvironmentRecord>> {
        service_environments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Match the service by its external CI UID and the environment by name
    pub async fn find_by_service_uid(
        &self,
        service_uid: &str,
        environment: &str,
    ) -> DatabaseResult<Option<ServiceEnvironmentRecord>> {
        let service = services::Entity::find()
            .filter(services::Column::CiUid.eq(service_uid))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        match service {
            Some(service) => self.find_in_environment(&[service.id], environment).await,
            None => Ok(None),
        }
    }

    /// Match the service by name and the environment by name
    pub async fn find_by_service_name(
        &self,
        service_name: &str,
        environment: &str,
    ) -> DatabaseResult<Option<ServiceEnvironmentRecord>> {
        let service_ids: Vec<i32> = services::Entity::find()
            .filter(services::Column::Name.eq(service_name))
            .order_by_asc(services::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?
            .into_iter()
            .map(|service| service.id)
            .collect();

        if service_ids.is_empty() {
            return Ok(None);
        }
        self.find_in_environment(&service_ids, environment).await
    }

    /// Ids of every service environment belonging to a service
    pub async fn ids_for_service(&self, service_id: i32) -> DatabaseResult<Vec<i32>> {
        let records = service_environments::Entity::find()
            .filter(service_environments::Column::ServiceId.eq(service_id))
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(records.into_iter().map(|record| record.id).collect())
    }

    async fn find_in_environment(
        &self,
        service_ids: &[i32],
        environment: &str,
    ) -> DatabaseResult<Option<ServiceEnvironmentRecord>> {
        let environment = environments::Entity::find()
            .filter(environments::Column::Name.eq(environment))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        let Some(environment) = environment else {
            return Ok(None);
        };

        service_environments::Entity::find()
            .filter(service_environments::Column::ServiceId.is_in(service_ids.iter().copied()))
            .filter(service_environments::Column::EnvironmentId.eq(environment.id))
            .order_by_asc(service_environments::Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }
}

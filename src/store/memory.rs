//! In-memory production store for testing and offline tooling.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::types::{EntityKind, EntityRef, NewPublish, ProjectRef, PublishRecord, TaskRef};
use super::{ProductionStore, TaskMatch};

/// Error type for in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InMemoryError {
    /// Publish targets an entity that was never added.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),
    /// Version already registered for this base name.
    #[error("Publish '{name}' v{version} already exists")]
    VersionExists {
        /// Published base name.
        name: String,
        /// Conflicting version.
        version: u32,
    },
}

type EntityKey = (u64, EntityKind, String, String);
type PublishKey = (u64, u64, String);

/// In-memory production store.
///
/// Uses BTreeMap for deterministic iteration order. Publishes sit behind a
/// lock so `register_publish` works through a shared reference.
#[derive(Debug, Default)]
pub struct InMemoryProductionStore {
    /// (project, kind, category, code) -> entity.
    entities: BTreeMap<EntityKey, EntityRef>,
    /// Entity id -> tasks, ordered by task id.
    tasks: BTreeMap<u64, Vec<TaskRef>>,
    /// (project, entity, base name) -> records, ordered by version.
    publishes: RwLock<BTreeMap<PublishKey, Vec<PublishRecord>>>,
    next_publish_id: RwLock<u64>,
}

impl InMemoryProductionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity to a project.
    pub fn add_entity(&mut self, project: &ProjectRef, entity: EntityRef) {
        let key = (project.id, entity.kind, entity.category.clone(), entity.code.clone());
        self.entities.insert(key, entity);
    }

    /// Add a task to an entity.
    pub fn add_task(&mut self, entity: &EntityRef, task: TaskRef) {
        let tasks = self.tasks.entry(entity.id).or_default();
        tasks.push(task);
        tasks.sort_by_key(|t| t.id);
    }

    /// Seed an existing publish row, keeping its timestamp.
    pub fn add_publish(&mut self, project: &ProjectRef, entity: &EntityRef, record: PublishRecord) {
        let next_id = self.next_publish_id.get_mut();
        *next_id = (*next_id).max(record.id);

        let records = self
            .publishes
            .get_mut()
            .entry((project.id, entity.id, record.name.clone()))
            .or_default();
        records.push(record);
        records.sort_by_key(|r| (r.version_number, r.id));
    }

    /// Get number of entities.
    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }

    /// Get number of publish rows.
    pub fn num_publishes(&self) -> usize {
        self.publishes.read().values().map(Vec::len).sum()
    }

    fn has_entity(&self, project: &ProjectRef, entity: &EntityRef) -> bool {
        self.entities
            .iter()
            .any(|((project_id, ..), e)| *project_id == project.id && e.id == entity.id)
    }
}

#[async_trait]
impl ProductionStore for InMemoryProductionStore {
    type Error = InMemoryError;

    async fn find_entity(
        &self,
        project: &ProjectRef,
        kind: EntityKind,
        category: &str,
        code: &str,
    ) -> Result<Option<EntityRef>, Self::Error> {
        let key = (project.id, kind, category.to_string(), code.to_string());
        Ok(self.entities.get(&key).cloned())
    }

    async fn find_task(&self, entity: &EntityRef, by: &TaskMatch) -> Result<Option<TaskRef>, Self::Error> {
        let Some(tasks) = self.tasks.get(&entity.id) else {
            return Ok(None);
        };

        let found = tasks.iter().find(|task| match by {
            TaskMatch::ByName(name) => task.name == *name,
            TaskMatch::ByStep(step) => task.step.short_name == *step,
        });
        Ok(found.cloned())
    }

    async fn find_publish(
        &self,
        project: &ProjectRef,
        entity: &EntityRef,
        base_name: &str,
    ) -> Result<Option<PublishRecord>, Self::Error> {
        let key = (project.id, entity.id, base_name.to_string());
        Ok(self
            .publishes
            .read()
            .get(&key)
            .and_then(|records| records.last().cloned()))
    }

    async fn register_publish(&self, publish: NewPublish) -> Result<PublishRecord, Self::Error> {
        if !self.has_entity(&publish.project, &publish.entity) {
            return Err(InMemoryError::EntityNotFound(publish.entity.id));
        }

        let mut publishes = self.publishes.write();
        let records = publishes
            .entry((publish.project.id, publish.entity.id, publish.name.clone()))
            .or_default();

        if records.iter().any(|r| r.version_number == publish.version_number) {
            return Err(InMemoryError::VersionExists {
                name: publish.name,
                version: publish.version_number,
            });
        }

        let id = {
            let mut next_id = self.next_publish_id.write();
            *next_id += 1;
            *next_id
        };

        let record = PublishRecord {
            id,
            name: publish.name,
            version_number: publish.version_number,
            updated_at: Utc::now(),
            path: publish.path,
            publish_type: Some(publish.publish_type),
        };
        records.push(record.clone());
        records.sort_by_key(|r| (r.version_number, r.id));

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PublishType, StepRef};
    use chrono::TimeZone;

    fn project() -> ProjectRef {
        ProjectRef::new(1, "demo")
    }

    fn shot() -> EntityRef {
        EntityRef::new(EntityKind::Shot, 10, "SCN_010", "SCN")
    }

    fn record(id: u64, version: u32) -> PublishRecord {
        PublishRecord {
            id,
            name: "SCN_010_LGT.mov".to_string(),
            version_number: version,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            path: format!("/publish/SCN_010_LGT.v{:03}.mov", version),
            publish_type: Some(PublishType::Render),
        }
    }

    fn store() -> InMemoryProductionStore {
        let mut store = InMemoryProductionStore::new();
        store.add_entity(&project(), shot());
        store.add_task(&shot(), TaskRef::new(102, "Lighting", StepRef::new(2, "LGT")));
        store.add_task(&shot(), TaskRef::new(101, "Layout", StepRef::new(1, "LAY")));
        store.add_task(&shot(), TaskRef::new(103, "Lighting", StepRef::new(2, "LGT")));
        store
    }

    #[tokio::test]
    async fn test_find_entity_is_exact() {
        let store = store();

        let found = store.find_entity(&project(), EntityKind::Shot, "SCN", "SCN_010").await.unwrap();
        assert_eq!(found, Some(shot()));

        let other_project = ProjectRef::new(2, "other");
        assert!(store.find_entity(&other_project, EntityKind::Shot, "SCN", "SCN_010").await.unwrap().is_none());
        assert!(store.find_entity(&project(), EntityKind::Asset, "SCN", "SCN_010").await.unwrap().is_none());
        assert!(store.find_entity(&project(), EntityKind::Shot, "SCN", "scn_010").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_task_lowest_id_wins() {
        let store = store();

        let by_name = store.find_task(&shot(), &TaskMatch::ByName("Lighting".into())).await.unwrap();
        assert_eq!(by_name.unwrap().id, 102);

        let by_step = store.find_task(&shot(), &TaskMatch::ByStep("LAY".into())).await.unwrap();
        assert_eq!(by_step.unwrap().name, "Layout");

        let missing = store.find_task(&shot(), &TaskMatch::ByStep("CMP".into())).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_publish_returns_latest() {
        let mut store = store();
        store.add_publish(&project(), &shot(), record(1, 1));
        store.add_publish(&project(), &shot(), record(7, 4));
        store.add_publish(&project(), &shot(), record(3, 2));

        let latest = store.find_publish(&project(), &shot(), "SCN_010_LGT.mov").await.unwrap();
        assert_eq!(latest.unwrap().version_number, 4);

        let none = store.find_publish(&project(), &shot(), "SCN_010_ANM.mov").await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_register_publish() {
        let mut store = store();
        store.add_publish(&project(), &shot(), record(5, 1));

        let new = NewPublish {
            project: project(),
            entity: shot(),
            task: TaskRef::new(102, "Lighting", StepRef::new(2, "LGT")),
            name: "SCN_010_LGT.mov".to_string(),
            version_number: 2,
            path: "/publish/SCN_010_LGT.v002.mov".to_string(),
            publish_type: PublishType::Render,
        };

        let registered = store.register_publish(new.clone()).await.unwrap();
        assert_eq!(registered.id, 6);
        assert_eq!(registered.version_number, 2);
        assert_eq!(store.num_publishes(), 2);

        let again = store.register_publish(new).await;
        assert_eq!(
            again,
            Err(InMemoryError::VersionExists { name: "SCN_010_LGT.mov".to_string(), version: 2 })
        );
    }

    #[tokio::test]
    async fn test_register_unknown_entity() {
        let store = store();
        let stranger = EntityRef::new(EntityKind::Asset, 99, "Crate", "Prop");

        let result = store
            .register_publish(NewPublish {
                project: project(),
                entity: stranger,
                task: TaskRef::new(1, "Model", StepRef::new(3, "MDL")),
                name: "Crate.fbx".to_string(),
                version_number: 1,
                path: "/publish/Crate.v001.fbx".to_string(),
                publish_type: PublishType::Fbx,
            })
            .await;
        assert_eq!(result, Err(InMemoryError::EntityNotFound(99)));
    }
}

//! 上拉处理器
//!
//! 上拉只建立关联边，不生成任何单据。两端都必须是存活单据，
//! 重复上拉命中既有边时幂等返回。

use std::sync::Arc;

use async_trait::async_trait;
use mes_cqrs_core::CommandHandler;
use mes_errors::{AppError, AppResult};
use tracing::info;

use crate::application::commands::orchestrator::{PullDocumentCommand, PullOutcome};
use crate::domain::registry::load_document;
use crate::domain::relations::{pull_description, transition_allowed, DocRelation, RelationMode};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::infrastructure::observability::record_pull;

use super::edges::{record_edge, EdgeSpec};

pub struct PullDocumentHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl PullDocumentHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    async fn link(
        &self,
        uow: &dyn UnitOfWork,
        command: &PullDocumentCommand,
    ) -> AppResult<(DocRelation, bool)> {
        let tenant_id = &command.tenant_id;

        let source = load_document(uow, tenant_id, command.source_kind, command.source_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "源单据不存在: {}#{}",
                    command.source_kind.as_str(),
                    command.source_id
                ))
            })?;
        let target = load_document(uow, tenant_id, command.target_kind, command.target_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "目标单据不存在: {}#{}",
                    command.target_kind.as_str(),
                    command.target_id
                ))
            })?;

        record_edge(
            uow,
            tenant_id,
            command.created_by,
            EdgeSpec {
                source_kind: command.source_kind,
                source_id: command.source_id,
                source_code: source.code().to_string(),
                source_name: source.name().map(str::to_string),
                target_kind: command.target_kind,
                target_id: command.target_id,
                target_code: target.code().to_string(),
                target_name: target.name().map(str::to_string),
                mode: RelationMode::Pull,
                description: pull_description(command.source_kind, command.target_kind),
                business_mode: None,
                demand_id: source.demand_anchor(),
            },
        )
        .await
    }
}

#[async_trait]
impl CommandHandler<PullDocumentCommand> for PullDocumentHandler {
    async fn handle(&self, command: PullDocumentCommand) -> AppResult<PullOutcome> {
        // 上拉沿同一张转换表反向行走：目标方发起，从源方拉取关联
        if !transition_allowed(command.source_kind, command.target_kind) {
            record_pull(command.source_kind, command.target_kind, false);
            return Err(AppError::transition_not_allowed(format!(
                "不支持的上拉类型: {} -> {}",
                command.source_kind.as_str(),
                command.target_kind.as_str()
            )));
        }

        let uow = self.uow_factory.begin().await?;
        match self.link(uow.as_ref(), &command).await {
            Ok((edge, created)) => {
                uow.commit().await?;
                record_pull(command.source_kind, command.target_kind, true);
                info!(
                    tenant_id = %command.tenant_id,
                    source_kind = %command.source_kind,
                    source_id = command.source_id,
                    target_kind = %command.target_kind,
                    target_id = command.target_id,
                    created,
                    "Pull recorded"
                );
                Ok(PullOutcome {
                    message: "上拉成功".to_string(),
                    relation_id: edge.id,
                })
            }
            Err(e) => {
                uow.rollback().await?;
                record_pull(command.source_kind, command.target_kind, false);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::testing::*;
    use super::*;
    use crate::domain::documents::{BusinessMode, DocKind};

    fn pull(
        tenant_id: mes_common::TenantId,
        target_kind: DocKind,
        target_id: i64,
        source_kind: DocKind,
        source_id: i64,
    ) -> PullDocumentCommand {
        PullDocumentCommand {
            tenant_id,
            target_kind,
            target_id,
            source_kind,
            source_id,
            created_by: None,
        }
    }

    fn seeded_factory(tenant_id: mes_common::TenantId) -> Arc<FakeUnitOfWorkFactory> {
        let mut store = Store::default();
        let mut demand = audited_demand(tenant_id, BusinessMode::Mts);
        demand.id = 1;
        store.demands.push(demand);
        let mut computation = completed_computation(tenant_id, 1);
        computation.id = 100;
        store.computations.push(computation);
        Arc::new(FakeUnitOfWorkFactory::new(store))
    }

    #[tokio::test]
    async fn test_pull_records_edge_and_is_idempotent() {
        let tenant_id = tenant();
        let factory = seeded_factory(tenant_id);
        let handler = PullDocumentHandler::new(factory.clone());
        let command = pull(tenant_id, DocKind::DemandComputation, 100, DocKind::Demand, 1);

        let first = handler.handle(command.clone()).await.unwrap();
        let second = handler.handle(command).await.unwrap();
        assert_eq!(first.relation_id, second.relation_id);

        let store = factory.snapshot();
        assert_eq!(store.relations.len(), 1);
        let edge = &store.relations[0];
        assert_eq!(edge.relation_mode, RelationMode::Pull);
        assert_eq!(edge.relation_desc, "从demand_computation上拉到demand");
        assert_eq!(edge.demand_id, Some(1));
        assert_eq!(edge.source_code, "XQ-0001");
        assert_eq!(edge.target_code, "DC-0001");
    }

    #[tokio::test]
    async fn test_pull_missing_endpoint_leaves_no_edge() {
        let tenant_id = tenant();
        let factory = seeded_factory(tenant_id);
        let handler = PullDocumentHandler::new(factory.clone());

        let err = handler
            .handle(pull(tenant_id, DocKind::DemandComputation, 999, DocKind::Demand, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(factory.snapshot().relations.is_empty());
    }

    #[tokio::test]
    async fn test_pull_unknown_transition_rejected() {
        let tenant_id = tenant();
        let handler = PullDocumentHandler::new(Arc::new(FakeUnitOfWorkFactory::new(
            Store::default(),
        )));

        let err = handler
            .handle(pull(tenant_id, DocKind::Demand, 1, DocKind::WorkOrder, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TransitionNotAllowed(_)));
    }
}

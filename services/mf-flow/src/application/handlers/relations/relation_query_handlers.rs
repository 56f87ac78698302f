//! 单据关联查询处理器

use std::sync::Arc;

use async_trait::async_trait;
use mes_cqrs_core::QueryHandler;
use mes_errors::AppResult;

use crate::application::queries::relations::{
    DemandTraceQuery, DocumentRelations, DocumentRelationsQuery, RelationView,
};
use crate::domain::repositories::relations::RelationRepository;

/// 单据双向关联查询处理器
pub struct DocumentRelationsHandler {
    relations: Arc<dyn RelationRepository>,
}

impl DocumentRelationsHandler {
    pub fn new(relations: Arc<dyn RelationRepository>) -> Self {
        Self { relations }
    }
}

#[async_trait]
impl QueryHandler<DocumentRelationsQuery> for DocumentRelationsHandler {
    async fn handle(&self, query: DocumentRelationsQuery) -> AppResult<DocumentRelations> {
        let as_source = self
            .relations
            .list_targets(&query.tenant_id, query.kind, query.id, None)
            .await?;
        let as_target = self
            .relations
            .list_sources(&query.tenant_id, query.kind, query.id)
            .await?;
        Ok(DocumentRelations {
            as_source: as_source.into_iter().map(RelationView::from).collect(),
            as_target: as_target.into_iter().map(RelationView::from).collect(),
        })
    }
}

/// 需求追溯闭包查询处理器
///
/// 返回锚定在该需求上的全部传播边，供追溯视图使用。
pub struct DemandTraceHandler {
    relations: Arc<dyn RelationRepository>,
}

impl DemandTraceHandler {
    pub fn new(relations: Arc<dyn RelationRepository>) -> Self {
        Self { relations }
    }
}

#[async_trait]
impl QueryHandler<DemandTraceQuery> for DemandTraceHandler {
    async fn handle(&self, query: DemandTraceQuery) -> AppResult<Vec<RelationView>> {
        let edges = self
            .relations
            .list_by_demand(&query.tenant_id, query.demand_id)
            .await?;
        Ok(edges.into_iter().map(RelationView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use mes_common::{AuditInfo, TenantId};
    use mockall::mock;
    use uuid::Uuid;

    use super::*;
    use crate::domain::documents::DocKind;
    use crate::domain::relations::{push_description, DocRelation, RelationMode};

    mock! {
        RelationRepo {}

        #[async_trait]
        impl RelationRepository for RelationRepo {
            async fn find_existing(
                &self,
                tenant_id: &TenantId,
                source_kind: DocKind,
                source_id: i64,
                target_kind: DocKind,
                target_id: i64,
                mode: RelationMode,
            ) -> AppResult<Option<DocRelation>>;

            async fn insert(&self, relation: &DocRelation) -> AppResult<i64>;

            async fn list_targets(
                &self,
                tenant_id: &TenantId,
                source_kind: DocKind,
                source_id: i64,
                target_kind: Option<DocKind>,
            ) -> AppResult<Vec<DocRelation>>;

            async fn list_sources(
                &self,
                tenant_id: &TenantId,
                target_kind: DocKind,
                target_id: i64,
            ) -> AppResult<Vec<DocRelation>>;

            async fn list_by_demand(
                &self,
                tenant_id: &TenantId,
                demand_id: i64,
            ) -> AppResult<Vec<DocRelation>>;
        }
    }

    fn edge(id: i64, source_kind: DocKind, target_kind: DocKind) -> DocRelation {
        DocRelation {
            id,
            uuid: Uuid::now_v7(),
            tenant_id: TenantId::from_uuid(Uuid::now_v7()),
            source_kind,
            source_id: 100,
            source_code: "SRC-001".to_string(),
            source_name: None,
            target_kind,
            target_id: 200,
            target_code: "TGT-001".to_string(),
            target_name: None,
            relation_type: "source".to_string(),
            relation_mode: RelationMode::Push,
            relation_desc: push_description(source_kind, target_kind),
            business_mode: None,
            demand_id: Some(7),
            audit_info: AuditInfo::new(None),
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_document_relations_returns_both_directions() {
        let mut repo = MockRelationRepo::new();
        repo.expect_list_targets()
            .withf(|_, kind, id, filter| {
                *kind == DocKind::DemandComputation && *id == 100 && filter.is_none()
            })
            .returning(|_, _, _, _| {
                Ok(vec![edge(1, DocKind::DemandComputation, DocKind::WorkOrder)])
            });
        repo.expect_list_sources()
            .withf(|_, kind, id| *kind == DocKind::DemandComputation && *id == 100)
            .returning(|_, _, _| Ok(vec![edge(2, DocKind::Demand, DocKind::DemandComputation)]));

        let handler = DocumentRelationsHandler::new(Arc::new(repo));
        let result = handler
            .handle(DocumentRelationsQuery {
                tenant_id: TenantId::from_uuid(Uuid::now_v7()),
                kind: DocKind::DemandComputation,
                id: 100,
            })
            .await
            .unwrap();

        assert_eq!(result.as_source.len(), 1);
        assert_eq!(result.as_source[0].id, 1);
        assert_eq!(result.as_source[0].relation_mode, "push");
        assert_eq!(result.as_target.len(), 1);
        assert_eq!(result.as_target[0].id, 2);
    }

    #[tokio::test]
    async fn test_demand_trace_maps_all_edges() {
        let mut repo = MockRelationRepo::new();
        repo.expect_list_by_demand()
            .withf(|_, demand_id| *demand_id == 7)
            .returning(|_, _| {
                Ok(vec![
                    edge(1, DocKind::Demand, DocKind::DemandComputation),
                    edge(2, DocKind::DemandComputation, DocKind::WorkOrder),
                ])
            });

        let handler = DemandTraceHandler::new(Arc::new(repo));
        let views = handler
            .handle(DemandTraceQuery {
                tenant_id: TenantId::from_uuid(Uuid::now_v7()),
                demand_id: 7,
            })
            .await
            .unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].demand_id, Some(7));
        assert_eq!(views[1].target_kind, DocKind::WorkOrder);
    }
}

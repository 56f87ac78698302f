//! 应用状态装配

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use crate::application::handlers::coding::{
    AllocateCodeHandler, CreateCodeRuleHandler, DeleteCodeRuleHandler, GetCodeRuleHandler,
    ListCodeRulesHandler, PreviewCodeHandler, UpdateCodeRuleHandler,
};
use crate::application::handlers::init::{
    LoadOpeningFinanceHandler, LoadOpeningInventoryHandler, LoadOpeningWipHandler,
};
use crate::application::handlers::orchestrator::{PullDocumentHandler, PushDocumentHandler};
use crate::application::handlers::relations::{DemandTraceHandler, DocumentRelationsHandler};
use crate::domain::unit_of_work::UnitOfWorkFactory;
use crate::infrastructure::master_data::PostgresMasterData;
use crate::infrastructure::persistence::{
    PostgresCodeRuleRepository, PostgresRelationRepository, PostgresUnitOfWorkFactory,
};

/// 路由共享状态，持有全部处理器
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub metrics: PrometheusHandle,

    pub push: Arc<PushDocumentHandler>,
    pub pull: Arc<PullDocumentHandler>,

    pub allocate_code: Arc<AllocateCodeHandler>,
    pub create_rule: Arc<CreateCodeRuleHandler>,
    pub update_rule: Arc<UpdateCodeRuleHandler>,
    pub delete_rule: Arc<DeleteCodeRuleHandler>,
    pub get_rule: Arc<GetCodeRuleHandler>,
    pub list_rules: Arc<ListCodeRulesHandler>,
    pub preview_code: Arc<PreviewCodeHandler>,

    pub document_relations: Arc<DocumentRelationsHandler>,
    pub demand_trace: Arc<DemandTraceHandler>,

    pub load_inventory: Arc<LoadOpeningInventoryHandler>,
    pub load_wip: Arc<LoadOpeningWipHandler>,
    pub load_finance: Arc<LoadOpeningFinanceHandler>,
}

impl AppState {
    pub fn new(pool: PgPool, metrics: PrometheusHandle) -> Self {
        let uow_factory: Arc<dyn UnitOfWorkFactory> =
            Arc::new(PostgresUnitOfWorkFactory::new(pool.clone()));
        let master_data = Arc::new(PostgresMasterData::new(pool.clone()));
        let rule_repo = Arc::new(PostgresCodeRuleRepository::new(pool.clone()));
        let relation_repo = Arc::new(PostgresRelationRepository::new(pool.clone()));

        Self {
            push: Arc::new(PushDocumentHandler::new(
                uow_factory.clone(),
                master_data.clone(),
                master_data.clone(),
            )),
            pull: Arc::new(PullDocumentHandler::new(uow_factory.clone())),

            allocate_code: Arc::new(AllocateCodeHandler::new(uow_factory.clone())),
            create_rule: Arc::new(CreateCodeRuleHandler::new(uow_factory.clone())),
            update_rule: Arc::new(UpdateCodeRuleHandler::new(uow_factory.clone())),
            delete_rule: Arc::new(DeleteCodeRuleHandler::new(uow_factory.clone())),
            get_rule: Arc::new(GetCodeRuleHandler::new(rule_repo.clone())),
            list_rules: Arc::new(ListCodeRulesHandler::new(rule_repo)),
            preview_code: Arc::new(PreviewCodeHandler),

            document_relations: Arc::new(DocumentRelationsHandler::new(relation_repo.clone())),
            demand_trace: Arc::new(DemandTraceHandler::new(relation_repo)),

            load_inventory: Arc::new(LoadOpeningInventoryHandler::new(
                uow_factory.clone(),
                master_data.clone(),
                master_data.clone(),
                master_data.clone(),
            )),
            load_wip: Arc::new(LoadOpeningWipHandler::new(
                uow_factory.clone(),
                master_data.clone(),
                master_data.clone(),
                master_data.clone(),
                master_data.clone(),
            )),
            load_finance: Arc::new(LoadOpeningFinanceHandler::new(
                uow_factory,
                master_data.clone(),
                master_data,
            )),

            pool,
            metrics,
        }
    }
}

//! 内嵌数据库迁移
//!
//! 启动时由 MigrationRunner 按版本号顺序应用。

use mes_adapter_postgres::Migration;

/// 服务的全部迁移定义
pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new(1, "create_coding_tables", CREATE_CODING_TABLES),
        Migration::new(2, "create_document_tables", CREATE_DOCUMENT_TABLES),
        Migration::new(3, "create_relation_tables", CREATE_RELATION_TABLES),
        Migration::new(4, "create_master_data_tables", CREATE_MASTER_DATA_TABLES),
    ]
}

const CREATE_CODING_TABLES: &str = r#"
CREATE TABLE sys_code_rules (
    id BIGSERIAL PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    tenant_id UUID NOT NULL,
    code VARCHAR(64) NOT NULL,
    name VARCHAR(128) NOT NULL,
    template VARCHAR(256) NOT NULL,
    seq_start BIGINT NOT NULL DEFAULT 1,
    seq_step BIGINT NOT NULL DEFAULT 1,
    seq_width BIGINT NOT NULL DEFAULT 4,
    reset_policy VARCHAR(16) NOT NULL DEFAULT 'never',
    is_system BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX ux_sys_code_rules_tenant_code
    ON sys_code_rules (tenant_id, code)
    WHERE deleted_at IS NULL;

CREATE TABLE sys_code_sequences (
    id BIGSERIAL PRIMARY KEY,
    rule_id BIGINT NOT NULL REFERENCES sys_code_rules (id),
    tenant_id UUID NOT NULL,
    scope_key VARCHAR(64) NOT NULL DEFAULT '',
    current_value BIGINT NOT NULL,
    last_reset DATE,
    UNIQUE (rule_id, tenant_id, scope_key)
);

CREATE TABLE sys_code_mappings (
    id BIGSERIAL PRIMARY KEY,
    tenant_id UUID NOT NULL,
    external_system VARCHAR(64) NOT NULL,
    entity_type VARCHAR(64) NOT NULL,
    external_code VARCHAR(128) NOT NULL,
    internal_code VARCHAR(128) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (tenant_id, external_system, entity_type, external_code)
);
"#;

const CREATE_DOCUMENT_TABLES: &str = r#"
CREATE TABLE demands (
    id BIGSERIAL PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    tenant_id UUID NOT NULL,
    demand_code VARCHAR(64) NOT NULL,
    demand_name VARCHAR(256) NOT NULL,
    business_mode VARCHAR(8) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE,
    customer_id BIGINT,
    customer_name VARCHAR(256),
    order_date DATE,
    delivery_date DATE,
    total_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    status VARCHAR(16) NOT NULL,
    review_status VARCHAR(16) NOT NULL,
    pushed_to_computation BOOLEAN NOT NULL DEFAULT FALSE,
    computation_id BIGINT,
    computation_code VARCHAR(64),
    remarks TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE INDEX ix_demands_tenant ON demands (tenant_id) WHERE deleted_at IS NULL;

CREATE TABLE demand_computations (
    id BIGSERIAL PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    tenant_id UUID NOT NULL,
    computation_code VARCHAR(64) NOT NULL,
    demand_id BIGINT NOT NULL,
    demand_code VARCHAR(64) NOT NULL,
    business_mode VARCHAR(8) NOT NULL,
    computation_type VARCHAR(8) NOT NULL,
    computation_params JSONB NOT NULL DEFAULT '{}'::jsonb,
    status VARCHAR(16) NOT NULL,
    remarks TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE INDEX ix_demand_computations_demand
    ON demand_computations (tenant_id, demand_id)
    WHERE deleted_at IS NULL;

CREATE TABLE demand_computation_lines (
    id BIGSERIAL PRIMARY KEY,
    computation_id BIGINT NOT NULL REFERENCES demand_computations (id),
    material_id BIGINT NOT NULL,
    material_code VARCHAR(64) NOT NULL,
    material_name VARCHAR(256) NOT NULL,
    material_spec VARCHAR(256),
    unit VARCHAR(32),
    material_source VARCHAR(16) NOT NULL,
    required_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    available_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    safety_stock NUMERIC(18, 4) NOT NULL DEFAULT 0,
    gross_requirement NUMERIC(18, 4) NOT NULL DEFAULT 0,
    net_requirement NUMERIC(18, 4) NOT NULL DEFAULT 0,
    suggested_work_order_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    planned_production NUMERIC(18, 4) NOT NULL DEFAULT 0,
    suggested_purchase_order_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    planned_procurement NUMERIC(18, 4) NOT NULL DEFAULT 0,
    delivery_date DATE,
    production_start_date DATE,
    production_completion_date DATE,
    procurement_start_date DATE,
    procurement_completion_date DATE
);

CREATE INDEX ix_demand_computation_lines_computation
    ON demand_computation_lines (computation_id);

CREATE TABLE production_plans (
    id BIGSERIAL PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    tenant_id UUID NOT NULL,
    plan_code VARCHAR(64) NOT NULL,
    plan_name VARCHAR(256) NOT NULL,
    plan_type VARCHAR(8) NOT NULL,
    source_type VARCHAR(32) NOT NULL,
    source_id BIGINT NOT NULL,
    source_code VARCHAR(64) NOT NULL,
    plan_start_date DATE,
    plan_end_date DATE,
    status VARCHAR(16) NOT NULL,
    remarks TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE TABLE production_plan_lines (
    id BIGSERIAL PRIMARY KEY,
    plan_id BIGINT NOT NULL REFERENCES production_plans (id),
    material_id BIGINT NOT NULL,
    material_code VARCHAR(64) NOT NULL,
    material_name VARCHAR(256) NOT NULL,
    material_source VARCHAR(16) NOT NULL,
    planned_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    suggested_action VARCHAR(16) NOT NULL,
    work_order_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    purchase_order_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    execution_status VARCHAR(16) NOT NULL,
    work_order_id BIGINT,
    purchase_order_id BIGINT,
    notes TEXT
);

CREATE INDEX ix_production_plan_lines_plan ON production_plan_lines (plan_id);

CREATE TABLE work_orders (
    id BIGSERIAL PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    tenant_id UUID NOT NULL,
    code VARCHAR(64) NOT NULL,
    name VARCHAR(256) NOT NULL,
    material_id BIGINT NOT NULL,
    material_code VARCHAR(64) NOT NULL,
    material_name VARCHAR(256) NOT NULL,
    quantity NUMERIC(18, 4) NOT NULL,
    production_mode VARCHAR(8) NOT NULL,
    status VARCHAR(16) NOT NULL,
    priority VARCHAR(16) NOT NULL,
    planned_start_date DATE,
    planned_end_date DATE,
    actual_start_date TIMESTAMPTZ,
    workshop_id BIGINT,
    workshop_name VARCHAR(256),
    completed_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    qualified_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    unqualified_quantity NUMERIC(18, 4) NOT NULL DEFAULT 0,
    source_type VARCHAR(32),
    source_id BIGINT,
    source_code VARCHAR(64),
    remarks TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX ux_work_orders_tenant_code
    ON work_orders (tenant_id, code)
    WHERE deleted_at IS NULL;

CREATE TABLE work_order_operations (
    id BIGSERIAL PRIMARY KEY,
    work_order_id BIGINT NOT NULL REFERENCES work_orders (id),
    operation_id BIGINT NOT NULL,
    operation_code VARCHAR(64) NOT NULL,
    operation_name VARCHAR(256) NOT NULL,
    sequence INT NOT NULL,
    status VARCHAR(16) NOT NULL,
    actual_start_date TIMESTAMPTZ,
    remarks TEXT
);

CREATE TABLE purchase_orders (
    id BIGSERIAL PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    tenant_id UUID NOT NULL,
    order_code VARCHAR(64) NOT NULL,
    order_name VARCHAR(256),
    supplier_id BIGINT NOT NULL,
    supplier_name VARCHAR(256) NOT NULL,
    order_date DATE NOT NULL,
    delivery_date DATE,
    status VARCHAR(16) NOT NULL,
    total_amount NUMERIC(18, 4) NOT NULL DEFAULT 0,
    remarks TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE TABLE purchase_order_lines (
    id BIGSERIAL PRIMARY KEY,
    order_id BIGINT NOT NULL REFERENCES purchase_orders (id),
    material_id BIGINT NOT NULL,
    material_code VARCHAR(64) NOT NULL,
    material_name VARCHAR(256) NOT NULL,
    material_spec VARCHAR(256),
    unit VARCHAR(32) NOT NULL,
    ordered_quantity NUMERIC(18, 4) NOT NULL,
    unit_price NUMERIC(18, 4) NOT NULL DEFAULT 0,
    total_price NUMERIC(18, 4) NOT NULL DEFAULT 0,
    required_date DATE,
    source_type VARCHAR(32),
    source_id BIGINT,
    remarks TEXT
);

CREATE TABLE purchase_requisitions (
    id BIGSERIAL PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    tenant_id UUID NOT NULL,
    requisition_code VARCHAR(64) NOT NULL,
    requisition_name VARCHAR(256) NOT NULL,
    status VARCHAR(16) NOT NULL,
    requisition_date DATE NOT NULL,
    source_type VARCHAR(32) NOT NULL,
    source_id BIGINT NOT NULL,
    source_code VARCHAR(64) NOT NULL,
    remarks TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE TABLE purchase_requisition_lines (
    id BIGSERIAL PRIMARY KEY,
    requisition_id BIGINT NOT NULL REFERENCES purchase_requisitions (id),
    material_id BIGINT NOT NULL,
    material_code VARCHAR(64) NOT NULL,
    material_name VARCHAR(256) NOT NULL,
    material_spec VARCHAR(256),
    unit VARCHAR(32) NOT NULL,
    quantity NUMERIC(18, 4) NOT NULL,
    supplier_id BIGINT,
    required_date DATE,
    computation_line_id BIGINT
);

CREATE TABLE purchase_receipts (
    id BIGSERIAL PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    tenant_id UUID NOT NULL,
    receipt_code VARCHAR(64) NOT NULL,
    warehouse_id BIGINT NOT NULL,
    warehouse_code VARCHAR(64) NOT NULL,
    warehouse_name VARCHAR(256) NOT NULL,
    source_order_code VARCHAR(64) NOT NULL,
    supplier_id BIGINT NOT NULL,
    supplier_name VARCHAR(256) NOT NULL,
    status VARCHAR(16) NOT NULL,
    review_status VARCHAR(16) NOT NULL,
    receipt_time TIMESTAMPTZ NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE TABLE purchase_receipt_lines (
    id BIGSERIAL PRIMARY KEY,
    receipt_id BIGINT NOT NULL REFERENCES purchase_receipts (id),
    material_id BIGINT NOT NULL,
    material_code VARCHAR(64) NOT NULL,
    material_name VARCHAR(256) NOT NULL,
    unit VARCHAR(32),
    quantity NUMERIC(18, 4) NOT NULL,
    unit_price NUMERIC(18, 4) NOT NULL DEFAULT 0,
    total_amount NUMERIC(18, 4) NOT NULL DEFAULT 0,
    batch_number VARCHAR(64),
    location_code VARCHAR(64)
);

CREATE TABLE finance_documents (
    id BIGSERIAL PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    tenant_id UUID NOT NULL,
    kind VARCHAR(16) NOT NULL,
    document_code VARCHAR(64) NOT NULL,
    customer_id BIGINT,
    customer_name VARCHAR(256),
    supplier_id BIGINT,
    supplier_name VARCHAR(256),
    source_type VARCHAR(32) NOT NULL,
    source_id BIGINT NOT NULL,
    source_code VARCHAR(64) NOT NULL,
    business_date DATE NOT NULL,
    due_date DATE NOT NULL,
    total_amount NUMERIC(18, 4) NOT NULL,
    settled_amount NUMERIC(18, 4) NOT NULL DEFAULT 0,
    remaining_amount NUMERIC(18, 4) NOT NULL,
    status VARCHAR(16) NOT NULL,
    review_status VARCHAR(16) NOT NULL,
    has_invoice BOOLEAN NOT NULL DEFAULT FALSE,
    invoice_number VARCHAR(64),
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ
);
"#;

const CREATE_RELATION_TABLES: &str = r#"
CREATE TABLE doc_relations (
    id BIGSERIAL PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    tenant_id UUID NOT NULL,
    source_kind VARCHAR(32) NOT NULL,
    source_id BIGINT NOT NULL,
    source_code VARCHAR(64) NOT NULL,
    source_name VARCHAR(256),
    target_kind VARCHAR(32) NOT NULL,
    target_id BIGINT NOT NULL,
    target_code VARCHAR(64) NOT NULL,
    target_name VARCHAR(256),
    relation_type VARCHAR(32) NOT NULL DEFAULT 'source',
    relation_mode VARCHAR(8) NOT NULL,
    relation_desc VARCHAR(256) NOT NULL,
    business_mode VARCHAR(8),
    demand_id BIGINT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_by UUID,
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX ux_doc_relations_dedup
    ON doc_relations (tenant_id, source_kind, source_id, target_kind, target_id, relation_mode)
    WHERE deleted_at IS NULL;

CREATE INDEX ix_doc_relations_source
    ON doc_relations (tenant_id, source_kind, source_id)
    WHERE deleted_at IS NULL;

CREATE INDEX ix_doc_relations_target
    ON doc_relations (tenant_id, target_kind, target_id)
    WHERE deleted_at IS NULL;

CREATE INDEX ix_doc_relations_demand
    ON doc_relations (tenant_id, demand_id)
    WHERE deleted_at IS NULL;
"#;

const CREATE_MASTER_DATA_TABLES: &str = r#"
CREATE TABLE materials (
    id BIGSERIAL PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(64) NOT NULL,
    name VARCHAR(256) NOT NULL,
    spec VARCHAR(256),
    unit VARCHAR(32),
    default_supplier_id BIGINT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX ux_materials_tenant_code
    ON materials (tenant_id, code)
    WHERE deleted_at IS NULL;

CREATE TABLE warehouses (
    id BIGSERIAL PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(64) NOT NULL,
    name VARCHAR(256) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX ux_warehouses_tenant_code
    ON warehouses (tenant_id, code)
    WHERE deleted_at IS NULL;

CREATE TABLE operations (
    id BIGSERIAL PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(64) NOT NULL,
    name VARCHAR(256) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX ux_operations_tenant_code
    ON operations (tenant_id, code)
    WHERE deleted_at IS NULL;

CREATE TABLE suppliers (
    id BIGSERIAL PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(64) NOT NULL,
    name VARCHAR(256) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX ux_suppliers_tenant_code
    ON suppliers (tenant_id, code)
    WHERE deleted_at IS NULL;

CREATE TABLE customers (
    id BIGSERIAL PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(64) NOT NULL,
    name VARCHAR(256) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX ux_customers_tenant_code
    ON customers (tenant_id, code)
    WHERE deleted_at IS NULL;

CREATE TABLE workshops (
    id BIGSERIAL PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(64) NOT NULL,
    name VARCHAR(256) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX ux_workshops_tenant_code
    ON workshops (tenant_id, code)
    WHERE deleted_at IS NULL;
"#;

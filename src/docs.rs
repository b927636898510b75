// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chopp Backend",
        description = "Chopp e chopeiras: catálogo, estoque, locações, PDV com consignado e relatórios."
    ),
    paths(
        // --- Catálogo e estoque ---
        handlers::catalog::list_products,
        handlers::catalog::create_product,
        handlers::catalog::get_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::stock_summary,
        handlers::catalog::record_movement,
        handlers::catalog::list_movements,
        handlers::catalog::audit_stock,
        handlers::catalog::reconcile_product,

        // --- Cadastros ---
        handlers::directory::list_customers,
        handlers::directory::create_customer,
        handlers::directory::get_customer,
        handlers::directory::update_customer,
        handlers::directory::delete_customer,
        handlers::directory::list_assets,
        handlers::directory::create_asset,
        handlers::directory::get_asset,
        handlers::directory::update_asset,
        handlers::directory::delete_asset,

        // --- Locações ---
        handlers::rentals::list_rentals,
        handlers::rentals::create_rental,
        handlers::rentals::return_rental,

        // --- Pedidos ---
        handlers::orders::quote,
        handlers::orders::place_order,
        handlers::orders::list_orders,
        handlers::orders::list_consignments,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::confirm_sold,
        handlers::orders::confirm_returned,
        handlers::orders::cancel_order,
        handlers::orders::delete_order,

        // --- Financeiro ---
        handlers::finance::list_expenses,
        handlers::finance::create_expense,
        handlers::finance::update_expense,
        handlers::finance::delete_expense,
        handlers::finance::list_employees,
        handlers::finance::create_employee,
        handlers::finance::update_employee,
        handlers::finance::toggle_employee,
        handlers::finance::delete_employee,

        // --- Relatórios ---
        handlers::reports::financial_report,
        handlers::reports::dashboard,
    ),
    components(
        schemas(
            // --- Catálogo ---
            models::catalog::MovementType,
            models::catalog::Product,
            models::catalog::ProductView,
            models::catalog::ProductPayload,
            models::catalog::CreateProductPayload,
            models::catalog::StockMovement,
            models::catalog::StockMovementPayload,
            models::catalog::StockMovementReceipt,
            models::catalog::StockSummary,
            models::catalog::StockAudit,

            // --- Cadastros ---
            models::directory::Customer,
            models::directory::CustomerPayload,
            models::directory::AssetStatus,
            models::directory::Asset,
            models::directory::AssetPayload,

            // --- Locações ---
            models::rentals::RentalStatus,
            models::rentals::Rental,
            models::rentals::RentalDetail,
            handlers::rentals::CreateRentalPayload,

            // --- Pedidos ---
            models::orders::OrderStatus,
            models::orders::PaymentMethod,
            models::orders::DiscountKind,
            models::orders::Discount,
            models::orders::Order,
            models::orders::OrderItem,
            models::orders::OrderItemDetail,
            models::orders::OrderSummary,
            models::orders::OrderDetail,
            models::orders::PricedLine,
            models::orders::CartPricing,
            models::orders::CartLinePayload,
            models::orders::QuotePayload,
            models::orders::CheckoutPayload,
            models::orders::UpdateOrderPayload,

            // --- Financeiro ---
            models::finance::ExpenseCategory,
            models::finance::Expense,
            models::finance::ExpensePayload,
            models::finance::Employee,
            models::finance::EmployeePayload,

            // --- Relatórios ---
            models::reports::ReportPeriod,
            models::reports::CategoryTotal,
            models::reports::FinancialReport,
            models::reports::DashboardStats,
            models::reports::Dashboard,
        )
    ),
    tags(
        (name = "Catálogo", description = "Produtos, preços e margens"),
        (name = "Estoque", description = "Movimentações e auditoria do saldo"),
        (name = "Cadastros", description = "Clientes e chopeiras"),
        (name = "Locações", description = "Saída e devolução de chopeiras"),
        (name = "Pedidos", description = "PDV, consignado e fechamento"),
        (name = "Financeiro", description = "Despesas e funcionários"),
        (name = "Relatórios", description = "Relatório financeiro e painel")
    )
)]
pub struct ApiDoc;

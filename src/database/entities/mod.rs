pub mod daily_assets;
pub mod daily_usages;
pub mod dynamic_extra_cost_types;
pub mod dynamic_extra_costs;
pub mod environments;
pub mod extra_cost_types;
pub mod extra_costs;
pub mod service_environments;
pub mod services;
pub mod team_costs;
pub mod teams;
pub mod usage_prices;
pub mod usage_types;
pub mod warehouses;

pub use daily_assets::Entity as DailyAssets;
pub use daily_usages::Entity as DailyUsages;
pub use dynamic_extra_cost_types::Entity as DynamicExtraCostTypes;
pub use dynamic_extra_costs::Entity as DynamicExtraCosts;
pub use environments::Entity as Environments;
pub use extra_cost_types::Entity as ExtraCostTypes;
pub use extra_costs::Entity as ExtraCosts;
pub use service_environments::Entity as ServiceEnvironments;
pub use services::Entity as Services;
pub use team_costs::Entity as TeamCosts;
pub use teams::Entity as Teams;
pub use usage_prices::Entity as UsagePrices;
pub use usage_types::Entity as UsageTypes;
pub use warehouses::Entity as Warehouses;

// Type aliases
pub type ServiceRecord = services::Model;
pub type EnvironmentRecord = environments::Model;
pub type ServiceEnvironmentRecord = service_environments::Model;
pub type WarehouseRecord = warehouses::Model;
pub type UsageTypeRecord = usage_types::Model;
pub type UsagePriceRecord = usage_prices::Model;
pub type TeamRecord = teams::Model;
pub type TeamCostRecord = team_costs::Model;
pub type ExtraCostTypeRecord = extra_cost_types::Model;
pub type ExtraCostRecord = extra_costs::Model;
pub type DynamicExtraCostTypeRecord = dynamic_extra_cost_types::Model;
pub type DynamicExtraCostRecord = dynamic_extra_costs::Model;
pub type DailyUsageRecord = daily_usages::Model;
pub type DailyAssetRecord = daily_assets::Model;

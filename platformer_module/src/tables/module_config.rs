use spacetimedb::Identity;

/// Singleton row id of [`ModuleConfig`]
pub const MODULE_CONFIG_ID: u32 = 0;

/// Private module settings.
///
/// `owner` is the identity that initialised the module. The admin key gates the
/// static-data loaders and is unset until the owner configures one.
#[derive(Clone, Debug)]
#[spacetimedb::table(name = module_config)]
pub struct ModuleConfig {
    #[primary_key]
    pub id: u32,
    pub owner: Identity,
    pub admin_api_key: Option<String>,
}

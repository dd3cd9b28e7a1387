mod reload;

pub use reload::ReloadMappingsUseCase;

use restyle_accounts::AccountError;
use restyle_providers::ProviderError;
use thiserror::Error;

/// Failures while assembling a pipeline from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to create text generator: {0}")]
    Provider(#[from] ProviderError),

    #[error("failed to create account store: {0}")]
    Accounts(#[from] AccountError),

    #[error("accounts are enabled but supabaseUrl / serviceKey are not set")]
    AccountsNotConfigured,
}

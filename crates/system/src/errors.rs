use tbtc_params::ParamsError;
use tbtc_primitives::{LotSizeSetError, U256};
use thiserror::Error;

pub type SystemResult<T> = Result<T, SystemError>;

/// Why a caller was refused access to an operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum AuthFailure {
    /// The operation is reserved for the system owner.
    #[error("Ownable: caller is not the owner")]
    NotOwner,

    /// The caller holds no deposit ownership credential.
    #[error("caller must hold valid authorization")]
    MissingCredential,
}

/// Failures reported by a keep factory.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum KeepFactoryError {
    #[error("fee too low to open keep (required {required}, paid {paid})")]
    InsufficientFee { required: U256, paid: U256 },

    #[error("open keep rejected: {0}")]
    Rejected(String),
}

/// Errors returned by system operations.
///
/// The `Display` text is the stable, user-facing reason. A failed operation
/// leaves the system exactly as it was before the call.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SystemError {
    #[error("{0}")]
    Unauthorized(AuthFailure),

    #[error(transparent)]
    InvalidLotSizeSet(#[from] LotSizeSetError),

    #[error("emergencyPauseNewDeposits can only be called once")]
    AlreadyPaused,

    #[error("Deposits are still paused")]
    StillPaused,

    #[error("Opening new deposits is currently disabled")]
    DepositsPaused,

    #[error("no lot size at index {index} ({available} available)")]
    UnknownLotSize { index: usize, available: usize },

    #[error("signer fee divisor must be greater than zero")]
    InvalidSignerFeeDivisor,

    #[error("Ownable: new owner is the zero address")]
    InvalidOwner,

    #[error("keep factory: {0}")]
    KeepFactory(#[from] KeepFactoryError),

    #[error("invalid params: {0}")]
    Params(#[from] ParamsError),
}

/// Fieldless discriminant of [`SystemError`], for callers that only branch
/// on the failure class.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    InvalidLotSizeSet,
    AlreadyPaused,
    StillPaused,
    DepositsPaused,
    UnknownLotSize,
    InvalidSignerFeeDivisor,
    InvalidOwner,
    KeepFactory,
    Params,
}

impl SystemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SystemError::Unauthorized(_) => ErrorKind::Unauthorized,
            SystemError::InvalidLotSizeSet(_) => ErrorKind::InvalidLotSizeSet,
            SystemError::AlreadyPaused => ErrorKind::AlreadyPaused,
            SystemError::StillPaused => ErrorKind::StillPaused,
            SystemError::DepositsPaused => ErrorKind::DepositsPaused,
            SystemError::UnknownLotSize { .. } => ErrorKind::UnknownLotSize,
            SystemError::InvalidSignerFeeDivisor => ErrorKind::InvalidSignerFeeDivisor,
            SystemError::InvalidOwner => ErrorKind::InvalidOwner,
            SystemError::KeepFactory(_) => ErrorKind::KeepFactory,
            SystemError::Params(_) => ErrorKind::Params,
        }
    }
}

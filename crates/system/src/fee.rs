use crate::errors::{SystemError, SystemResult};

/// Signer fee accounting parameters.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FeePolicy {
    signer_fee_divisor: u64,
}

impl FeePolicy {
    pub fn new(signer_fee_divisor: u64) -> SystemResult<Self> {
        check_divisor(signer_fee_divisor)?;
        Ok(Self { signer_fee_divisor })
    }

    pub fn signer_fee_divisor(&self) -> u64 {
        self.signer_fee_divisor
    }

    pub fn set_signer_fee_divisor(&mut self, signer_fee_divisor: u64) -> SystemResult<()> {
        check_divisor(signer_fee_divisor)?;
        self.signer_fee_divisor = signer_fee_divisor;
        Ok(())
    }

    /// Fee owed to the signers of a deposit of `lot_size` satoshis.
    pub fn signer_fee(&self, lot_size: u64) -> u64 {
        lot_size / self.signer_fee_divisor
    }
}

fn check_divisor(divisor: u64) -> SystemResult<()> {
    if divisor == 0 {
        return Err(SystemError::InvalidSignerFeeDivisor);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_fee() {
        let policy = FeePolicy::new(200).unwrap();
        assert_eq!(policy.signer_fee(100_000_000), 500_000);
        assert_eq!(policy.signer_fee(199), 0);
    }

    #[test]
    fn test_zero_divisor_rejected() {
        assert_eq!(FeePolicy::new(0), Err(SystemError::InvalidSignerFeeDivisor));

        let mut policy = FeePolicy::new(200).unwrap();
        assert_eq!(
            policy.set_signer_fee_divisor(0),
            Err(SystemError::InvalidSignerFeeDivisor)
        );
        assert_eq!(policy.signer_fee_divisor(), 200);
    }
}

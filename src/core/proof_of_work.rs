use crate::core::Block;
use crate::error::{BlockchainError, Result};
use crate::utils::sha256_digest;
use data_encoding::HEXLOWER;
use log::debug;
use num_bigint::BigUint;
use std::ops::ShlAssign;

pub struct ProofOfWork<'a> {
    block: &'a Block,
    target: BigUint,
}

impl<'a> ProofOfWork<'a> {
    pub fn new_proof_of_work(block: &'a Block) -> Result<ProofOfWork<'a>> {
        let target = Self::target_for(block.get_difficulty()).ok_or_else(|| {
            BlockchainError::InvalidBlock(format!(
                "Difficulty {} is outside 0..=256",
                block.get_difficulty()
            ))
        })?;
        Ok(ProofOfWork { block, target })
    }

    /// 2^(256 - bits), or `None` when `bits` exceeds the digest width
    pub fn target_for(bits: u32) -> Option<BigUint> {
        if bits > 256 {
            return None;
        }
        let mut target = BigUint::from(1u8);
        target.shl_assign((256 - bits) as usize);
        Some(target)
    }

    /// True when `hash`, read as a big-endian unsigned integer, is below `target`
    pub fn meets_target(hash: &[u8], target: &BigUint) -> bool {
        BigUint::from_bytes_be(hash) < *target
    }

    /// Recompute the digest with the block's own nonce and check it against its target
    pub fn validate(block: &Block) -> bool {
        let pow = match ProofOfWork::new_proof_of_work(block) {
            Ok(pow) => pow,
            Err(_) => return false,
        };
        let hash = sha256_digest(pow.prepare_data(block.get_nonce()).as_slice());
        hash == block.get_hash() && Self::meets_target(&hash, &pow.target)
    }

    // Transactions only enter through the merkle root
    fn prepare_data(&self, nonce: u64) -> Vec<u8> {
        let mut data_bytes = vec![];
        data_bytes.extend(self.block.get_version().to_be_bytes());
        data_bytes.extend(self.block.get_pre_block_hash().as_bytes());
        data_bytes.extend(self.block.get_merkle_root());
        data_bytes.extend(self.block.get_timestamp().to_be_bytes());
        data_bytes.extend(self.block.get_difficulty().to_be_bytes());
        data_bytes.extend(nonce.to_be_bytes());
        data_bytes
    }

    /// Search nonces upward from zero and return the first that meets the target
    pub fn run(&self, max_nonce: u64) -> Result<(u64, Vec<u8>)> {
        debug!("Mining the block");
        for nonce in 0..=max_nonce {
            let hash = sha256_digest(self.prepare_data(nonce).as_slice());
            if Self::meets_target(&hash, &self.target) {
                debug!("Found {} at nonce {nonce}", HEXLOWER.encode(hash.as_slice()));
                return Ok((nonce, hash));
            }
        }
        Err(BlockchainError::ProofOfWorkExhausted { max_nonce })
    }
}

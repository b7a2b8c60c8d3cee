// This file implements the transaction model - how value moves through the ledger
// Each transaction consumes earlier outputs through its inputs and creates new outputs
// Ownership is decided purely by owner hashes; nothing here signs or verifies signatures

use crate::error::{BlockchainError, Result};
use crate::storage::UTXOSet;
use crate::utils::{deserialize, serialize, sha256_digest};
use crate::wallet::{hash_pub_key, owner_hash_of};
use data_encoding::HEXLOWER;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anything that can spend outputs on behalf of an owner.
///
/// The ledger only needs the opaque authorization blob (a public key) that goes
/// into every spend input; the owner hash is derived from it so the two can never
/// disagree.
pub trait SpendAuthority {
    fn authorization(&self) -> &[u8];

    fn owner_hash(&self) -> Vec<u8> {
        hash_pub_key(self.authorization())
    }
}

// An input either mints new value (coinbase) or points at an earlier output
// Think of a spend as "I want to use output #2 of transaction ABC123"
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub enum TXInput {
    /// Reward input: no predecessor, an arbitrary payload and a random salt
    Coinbase { data: Vec<u8>, salt: Vec<u8> },
    /// Reference to output `vout` of transaction `txid`
    Spend {
        txid: Vec<u8>,
        vout: usize,
        pub_key: Vec<u8>,
    },
}

impl TXInput {
    /// Reward input carrying `data` as given.
    ///
    /// The salt is a fresh UUID, so two rewards with the same payload to the
    /// same miner still hash to different transaction ids.
    pub fn coinbase(data: &[u8]) -> TXInput {
        TXInput::Coinbase {
            data: data.to_vec(),
            salt: Uuid::new_v4().as_bytes().to_vec(),
        }
    }

    pub fn get_coinbase_data(&self) -> Option<&[u8]> {
        match self {
            TXInput::Coinbase { data, .. } => Some(data.as_slice()),
            TXInput::Spend { .. } => None,
        }
    }

    pub fn spend(txid: &[u8], vout: usize, pub_key: &[u8]) -> TXInput {
        TXInput::Spend {
            txid: txid.to_vec(),
            vout,
            pub_key: pub_key.to_vec(),
        }
    }

    pub fn is_coinbase(&self) -> bool {
        matches!(self, TXInput::Coinbase { .. })
    }

    /// The `(txid, vout)` this input consumes, if it consumes anything
    pub fn spent_output(&self) -> Option<(&[u8], usize)> {
        match self {
            TXInput::Coinbase { .. } => None,
            TXInput::Spend { txid, vout, .. } => Some((txid.as_slice(), *vout)),
        }
    }

    /// True when this is a spend whose authorization resolves to `owner_hash`
    pub fn uses_key(&self, owner_hash: &[u8]) -> bool {
        match self {
            TXInput::Coinbase { .. } => false,
            TXInput::Spend { pub_key, .. } => hash_pub_key(pub_key).eq(owner_hash),
        }
    }
}

// An output is a "check" that can be cashed later by whoever owns the lock
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct TXOutput {
    value: u64,            // Amount in base units
    pub_key_hash: Vec<u8>, // Owner hash that can spend this output
}

impl TXOutput {
    /// Output of `value` locked to the owner behind `address`
    pub fn new(value: u64, address: &str) -> Result<TXOutput> {
        Ok(Self::locked_to(value, &owner_hash_of(address)?))
    }

    /// Output of `value` locked directly to an owner hash
    pub fn locked_to(value: u64, owner_hash: &[u8]) -> TXOutput {
        TXOutput {
            value,
            pub_key_hash: owner_hash.to_vec(),
        }
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }

    pub fn get_pub_key_hash(&self) -> &[u8] {
        self.pub_key_hash.as_slice()
    }

    pub fn is_locked_with_key(&self, owner_hash: &[u8]) -> bool {
        self.pub_key_hash.eq(owner_hash)
    }
}

// A transaction is an ordered list of inputs and outputs plus its content hash
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    id: Vec<u8>,         // Hash of everything below, computed last
    vin: Vec<TXInput>,   // What is being spent
    vout: Vec<TXOutput>, // Where the value goes
}

impl Transaction {
    /// Reward transaction paying `reward` to `to` with `data` as the coinbase payload
    pub fn new_coinbase_tx(to: &str, data: &str, reward: u64) -> Result<Transaction> {
        let txout = TXOutput::new(reward, to)?;

        let mut tx = Transaction {
            id: vec![],
            vin: vec![TXInput::coinbase(data.as_bytes())],
            vout: vec![txout],
        };
        tx.id = tx.hash()?;
        Ok(tx)
    }

    /// Spend `amount` from `from` to `to`, selecting inputs with `utxo_set`.
    ///
    /// Any surplus over `amount` comes back to the sender as a change output.
    pub fn new_utxo_transaction<S: SpendAuthority + ?Sized>(
        from: &S,
        to: &str,
        amount: u64,
        utxo_set: &UTXOSet<'_>,
    ) -> Result<Transaction> {
        if amount == 0 {
            return Err(BlockchainError::Transaction(
                "Amount must be positive".to_string(),
            ));
        }

        // Resolve the recipient before scanning the whole chain
        let recipient = TXOutput::new(amount, to)?;
        let from_hash = from.owner_hash();

        let selection = match utxo_set.select_for_amount(&from_hash, amount) {
            Ok(selection) => selection,
            Err(e) => {
                warn!(
                    "Cannot build spend from {}: {e}",
                    HEXLOWER.encode(from_hash.as_slice())
                );
                return Err(e);
            }
        };

        let inputs: Vec<TXInput> = selection
            .outputs
            .iter()
            .map(|(txid, vout)| TXInput::spend(txid, *vout, from.authorization()))
            .collect();

        let mut outputs = vec![recipient];
        if selection.total > amount {
            outputs.push(TXOutput::locked_to(selection.total - amount, &from_hash));
        }

        let mut tx = Transaction {
            id: vec![],
            vin: inputs,
            vout: outputs,
        };
        tx.id = tx.hash()?;
        debug!(
            "Built spend {} with {} inputs and {} outputs",
            HEXLOWER.encode(tx.get_id()),
            tx.vin.len(),
            tx.vout.len()
        );
        Ok(tx)
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].is_coinbase()
    }

    // The id is the hash of the encoding with the id field emptied
    fn hash(&self) -> Result<Vec<u8>> {
        let tx_copy = Transaction {
            id: vec![],
            vin: self.vin.clone(),
            vout: self.vout.clone(),
        };
        Ok(sha256_digest(tx_copy.serialize()?.as_slice()))
    }

    /// Recompute the content hash and compare it with the stored id
    pub fn verify_id(&self) -> Result<bool> {
        Ok(self.hash()? == self.id)
    }

    pub fn get_id(&self) -> &[u8] {
        self.id.as_slice()
    }

    pub fn get_vin(&self) -> &[TXInput] {
        self.vin.as_slice()
    }

    pub fn get_vout(&self) -> &[TXOutput] {
        self.vout.as_slice()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
        deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Wallet;

    #[test]
    fn test_coinbase_shape() {
        let miner = Wallet::new().unwrap();
        let tx = Transaction::new_coinbase_tx(&miner.get_address(), "tx1", 1_250).unwrap();

        assert!(tx.is_coinbase());
        assert_eq!(tx.get_vin().len(), 1);
        assert_eq!(tx.get_vin()[0].get_coinbase_data(), Some(&b"tx1"[..]));
        assert_eq!(tx.get_vout().len(), 1);
        assert_eq!(tx.get_vout()[0].get_value(), 1_250);
        assert!(tx.get_vout()[0].is_locked_with_key(&miner.owner_hash()));
        assert!(tx.verify_id().unwrap());
    }

    #[test]
    fn test_repeated_payload_gives_distinct_ids() {
        let miner = Wallet::new().unwrap().get_address();
        for payload in ["", "tag"] {
            let first = Transaction::new_coinbase_tx(&miner, payload, 10).unwrap();
            let second = Transaction::new_coinbase_tx(&miner, payload, 10).unwrap();
            assert_ne!(first.get_id(), second.get_id());
            assert_eq!(
                first.get_vin()[0].get_coinbase_data(),
                Some(payload.as_bytes())
            );
        }
    }

    #[test]
    fn test_coinbase_rejects_invalid_address() {
        let result = Transaction::new_coinbase_tx("not-an-address", "x", 10);
        assert!(matches!(result, Err(BlockchainError::InvalidAddress(_))));
    }

    #[test]
    fn test_single_spend_input_is_not_coinbase() {
        let owner = Wallet::new().unwrap();
        let tx = Transaction {
            id: vec![],
            vin: vec![TXInput::spend(&[1; 32], 0, owner.get_public_key())],
            vout: vec![TXOutput::locked_to(5, &owner.owner_hash())],
        };
        assert!(!tx.is_coinbase());
    }

    #[test]
    fn test_input_resolves_to_owner() {
        let owner = Wallet::new().unwrap();
        let stranger = Wallet::new().unwrap();
        let input = TXInput::spend(&[9; 32], 3, owner.get_public_key());

        assert!(input.uses_key(&owner.owner_hash()));
        assert!(!input.uses_key(&stranger.owner_hash()));
        assert_eq!(input.spent_output(), Some((&[9u8; 32][..], 3)));
        assert!(!TXInput::coinbase(b"x").uses_key(&owner.owner_hash()));
    }

    #[test]
    fn test_transaction_encoding_round_trip() {
        let miner = Wallet::new().unwrap().get_address();
        let tx = Transaction::new_coinbase_tx(&miner, "payload", 42).unwrap();
        let decoded = Transaction::deserialize(&tx.serialize().unwrap()).unwrap();
        assert_eq!(tx, decoded);
    }
}

use crate::core::{Blockchain, TXOutput};
use crate::error::{BlockchainError, Result};
use log::debug;
use std::collections::{HashMap, HashSet};

/// An output still owned by its lock, with its position in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendableOutput {
    pub txid: Vec<u8>,
    pub vout: usize,
    pub output: TXOutput,
}

/// Outputs picked to cover an amount, in discovery order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub outputs: Vec<(Vec<u8>, usize)>,
    pub total: u64,
}

/// Unspent-output resolver.
///
/// There is no index behind this: every query replays the whole chain from the
/// tail back to genesis.
pub struct UTXOSet<'a> {
    blockchain: &'a Blockchain,
}

impl<'a> UTXOSet<'a> {
    pub fn new(blockchain: &'a Blockchain) -> UTXOSet<'a> {
        UTXOSet { blockchain }
    }

    /// Every output locked to `pub_key_hash` that no later input spends, newest first
    pub fn find_spendable_outputs(&self, pub_key_hash: &[u8]) -> Result<Vec<SpendableOutput>> {
        let mut unspent = vec![];
        // ( K -> txid, V -> spent output indices )
        let mut spent_txos: HashMap<Vec<u8>, HashSet<usize>> = HashMap::new();

        for block in self.blockchain.iterator() {
            let block = block?;
            for tx in block.get_transactions() {
                // Inputs first, so an output spent in the same transaction is already marked
                if !tx.is_coinbase() {
                    for txin in tx.get_vin() {
                        if !txin.uses_key(pub_key_hash) {
                            continue;
                        }
                        if let Some((txid, vout)) = txin.spent_output() {
                            spent_txos.entry(txid.to_vec()).or_default().insert(vout);
                        }
                    }
                }

                let spent = spent_txos.get(tx.get_id());
                for (idx, out) in tx.get_vout().iter().enumerate() {
                    if !out.is_locked_with_key(pub_key_hash) {
                        continue;
                    }
                    if spent.is_some_and(|indices| indices.contains(&idx)) {
                        continue;
                    }
                    unspent.push(SpendableOutput {
                        txid: tx.get_id().to_vec(),
                        vout: idx,
                        output: out.clone(),
                    });
                }
            }
        }
        Ok(unspent)
    }

    pub fn get_balance(&self, pub_key_hash: &[u8]) -> Result<u64> {
        let mut balance = 0u64;
        for utxo in self.find_spendable_outputs(pub_key_hash)? {
            balance = balance
                .checked_add(utxo.output.get_value())
                .ok_or_else(|| BlockchainError::Transaction("Balance overflow".to_string()))?;
        }
        Ok(balance)
    }

    /// Take spendable outputs in discovery order until they cover `amount`
    pub fn select_for_amount(&self, pub_key_hash: &[u8], amount: u64) -> Result<Selection> {
        let mut selection = Selection::default();
        if amount == 0 {
            return Ok(selection);
        }

        for utxo in self.find_spendable_outputs(pub_key_hash)? {
            selection.total = selection
                .total
                .checked_add(utxo.output.get_value())
                .ok_or_else(|| BlockchainError::Transaction("Balance overflow".to_string()))?;
            selection.outputs.push((utxo.txid, utxo.vout));
            if selection.total >= amount {
                debug!(
                    "Selected {} outputs worth {} for {amount}",
                    selection.outputs.len(),
                    selection.total
                );
                return Ok(selection);
            }
        }

        Err(BlockchainError::InsufficientFunds {
            required: amount,
            available: selection.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transaction;
    use crate::testing::{create_test_blockchain, TestParty};

    #[test]
    fn test_genesis_reward_is_spendable() {
        let (blockchain, miner, _dir) = create_test_blockchain().unwrap();
        let utxo_set = UTXOSet::new(&blockchain);

        let outputs = utxo_set.find_spendable_outputs(&miner.owner_hash).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].vout, 0);
        assert_eq!(outputs[0].output.get_value(), blockchain.get_config().reward);
    }

    #[test]
    fn test_spent_outputs_are_excluded() {
        let (mut blockchain, miner, _dir) = create_test_blockchain().unwrap();
        let recipient = TestParty::new();
        let reward = blockchain.get_config().reward;

        let spend = Transaction::new_utxo_transaction(
            &miner.wallet,
            &recipient.address,
            reward / 4,
            &UTXOSet::new(&blockchain),
        )
        .unwrap();
        let genesis_coinbase = spend.get_vin()[0].spent_output().unwrap().0.to_vec();
        blockchain.mine_block(&[spend.clone()]).unwrap();

        let utxo_set = UTXOSet::new(&blockchain);
        let outputs = utxo_set.find_spendable_outputs(&miner.owner_hash).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].txid, spend.get_id());
        assert_eq!(outputs[0].vout, 1);
        assert!(outputs.iter().all(|o| o.txid != genesis_coinbase));

        assert_eq!(utxo_set.get_balance(&miner.owner_hash).unwrap(), reward - reward / 4);
        assert_eq!(utxo_set.get_balance(&recipient.owner_hash).unwrap(), reward / 4);
    }

    #[test]
    fn test_selection_stops_once_covered() {
        let (mut blockchain, miner, _dir) = create_test_blockchain().unwrap();
        let reward = blockchain.get_config().reward;
        for tag in ["one", "two"] {
            let coinbase = Transaction::new_coinbase_tx(&miner.address, tag, reward).unwrap();
            blockchain.mine_block(&[coinbase]).unwrap();
        }

        let utxo_set = UTXOSet::new(&blockchain);
        let selection = utxo_set
            .select_for_amount(&miner.owner_hash, reward + 1)
            .unwrap();
        assert_eq!(selection.outputs.len(), 2);
        assert_eq!(selection.total, 2 * reward);

        let exact = utxo_set.select_for_amount(&miner.owner_hash, reward).unwrap();
        assert_eq!(exact.outputs.len(), 1);
        assert_eq!(exact.total, reward);
    }

    #[test]
    fn test_same_reward_payload_yields_separate_outputs() {
        let (mut blockchain, miner, _dir) = create_test_blockchain().unwrap();
        let reward = blockchain.get_config().reward;
        for _ in 0..2 {
            let coinbase = Transaction::new_coinbase_tx(&miner.address, "same", reward).unwrap();
            blockchain.mine_block(&[coinbase]).unwrap();
        }

        let utxo_set = UTXOSet::new(&blockchain);
        let selection = utxo_set
            .select_for_amount(&miner.owner_hash, 3 * reward)
            .unwrap();
        let distinct: HashSet<_> = selection.outputs.iter().collect();
        assert_eq!(distinct.len(), 3);
        assert_eq!(selection.total, 3 * reward);
    }

    #[test]
    fn test_selection_reports_shortfall() {
        let (blockchain, miner, _dir) = create_test_blockchain().unwrap();
        let reward = blockchain.get_config().reward;
        let utxo_set = UTXOSet::new(&blockchain);

        let result = utxo_set.select_for_amount(&miner.owner_hash, reward + 1);
        match result {
            Err(BlockchainError::InsufficientFunds {
                required,
                available,
            }) => {
                assert_eq!(required, reward + 1);
                assert_eq!(available, reward);
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_owner_has_nothing() {
        let (blockchain, _miner, _dir) = create_test_blockchain().unwrap();
        let stranger = TestParty::new();
        let utxo_set = UTXOSet::new(&blockchain);

        assert_eq!(utxo_set.get_balance(&stranger.owner_hash).unwrap(), 0);
        assert!(utxo_set
            .find_spendable_outputs(&stranger.owner_hash)
            .unwrap()
            .is_empty());
        assert!(matches!(
            utxo_set.select_for_amount(&stranger.owner_hash, 1),
            Err(BlockchainError::InsufficientFunds { available: 0, .. })
        ));
    }
}

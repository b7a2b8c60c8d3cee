// Entry point for the ledgerchain CLI
// Every command loads the configuration first, then opens whatever it needs
use clap::Parser;
use data_encoding::HEXLOWER;
use ledgerchain::{
    coins_to_satoshis, convert_address, format_satoshis, hash_pub_key, owner_hash_of, Block,
    Blockchain, ChainConfig, Command, Opt, ProofOfWork, TXInput, Wallets,
};
use log::{error, LevelFilter};
use std::process;

fn main() {
    // Info level shows mining progress without the per-nonce noise
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let config = ChainConfig::load(opt.config.as_deref())?;

    match opt.command {
        Command::Createblockchain { address } => {
            let blockchain = Blockchain::create_blockchain(config, &address)?;
            blockchain.close()?;
            println!("Done!");
        }
        Command::Createwallet => {
            let mut wallets = Wallets::load(&config.data_dir)?;
            let address = wallets.create_wallet()?;
            println!("Your new address: {address}")
        }
        Command::GetBalance { address } => {
            let owner_hash = owner_hash_of(&address)?;
            let blockchain = Blockchain::open_blockchain(config)?;
            let balance = blockchain.get_balance(&owner_hash)?;
            println!("Balance of {address}: {}", format_satoshis(balance));
        }
        Command::ListAddresses => {
            let wallets = Wallets::load(&config.data_dir)?;
            for address in wallets.get_addresses() {
                println!("{address}")
            }
        }
        Command::Send {
            from,
            to,
            amount,
            miner,
            data,
        } => {
            let amount = coins_to_satoshis(amount)?;
            if amount == 0 {
                return Err("Amount must be positive".into());
            }
            owner_hash_of(&to)?;
            owner_hash_of(&miner)?;

            let wallets = Wallets::load(&config.data_dir)?;
            let wallet = wallets
                .get_wallet(&from)
                .ok_or_else(|| format!("No local wallet for sender {from}"))?;

            let mut blockchain = Blockchain::open_blockchain(config)?;
            let block = blockchain.send(wallet, &to, amount, &miner, &data)?;
            blockchain.close()?;
            println!("Success! Block {}", block.get_hash_hex())
        }
        Command::Printchain => {
            let blockchain = Blockchain::open_blockchain(config)?;
            for block in blockchain.iterator() {
                print_block(&block?);
            }
        }
    }
    Ok(())
}

fn print_block(block: &Block) {
    println!("Version: {}", block.get_version());
    println!("Pre block hash: {}", block.get_pre_block_hash().to_hex());
    println!("Merkle root: {}", HEXLOWER.encode(block.get_merkle_root()));
    println!("Timestamp: {}", block.get_timestamp());
    println!("Difficulty: {}", block.get_difficulty());
    println!("Nonce: {}", block.get_nonce());
    println!("Cur block hash: {}", block.get_hash_hex());
    println!("PoW valid: {}", ProofOfWork::validate(block));

    for tx in block.get_transactions() {
        println!("- Transaction txid_hex: {}", HEXLOWER.encode(tx.get_id()));

        for input in tx.get_vin() {
            match input {
                TXInput::Coinbase { data, .. } => {
                    println!("-- Coinbase data = {}", String::from_utf8_lossy(data))
                }
                TXInput::Spend {
                    txid,
                    vout,
                    pub_key,
                } => {
                    let address = convert_address(hash_pub_key(pub_key).as_slice());
                    println!(
                        "-- Input txid = {}, vout = {vout}, from = {address}",
                        HEXLOWER.encode(txid)
                    )
                }
            }
        }
        for output in tx.get_vout() {
            let address = convert_address(output.get_pub_key_hash());
            println!(
                "-- Output value = {}, to = {address}",
                format_satoshis(output.get_value())
            )
        }
    }
    println!()
}

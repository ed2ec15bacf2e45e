//! Command-line client for Permit3.
//!
//! Computes and signs Permit3 transfer intents with the configured account,
//! derives super-signature roots and relays signed intents to the
//! configured chain.

use alloy_primitives::{Address, Bytes, B256, U256};
use clap::{Args, Parser, Subcommand};
use permit3_account::AccountService;
use permit3_config::Config;
use permit3_delivery::{AlloyChainClient, SubmissionService};
use permit3_signing::{build_verify, calculate_root, recover_signer, Permit3Signer};
use permit3_types::{
	current_timestamp, PlainAsset, RequestedTransfer, SignatureTransfer, TransferDetails,
};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// Default lifetime of a signed intent when no deadline is given.
const DEFAULT_VALIDITY_SECS: u64 = 3600;

/// Command-line arguments for the Permit3 client.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", global = true)]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info", global = true)]
	log_level: String,

	/// Chain to sign for and submit to
	#[arg(long, global = true)]
	chain_id: Option<u64>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the configured account's address
	Address,
	/// Print the EIP-712 digest of a plain-token transfer
	TransferDigest {
		#[command(flatten)]
		transfer: TransferArgs,
		/// Digest of the no-nonce variant used as a super-signature member
		#[arg(long)]
		super_signature: bool,
	},
	/// Sign a plain-token transfer and print it as JSON
	SignTransfer(TransferArgs),
	/// Sign a plain-token transfer and execute it with the account as spender
	Transfer {
		#[command(flatten)]
		transfer: TransferArgs,
		/// Recipient of the tokens
		#[arg(long)]
		to: Address,
	},
	/// Print the root a signer registers for a digest list
	Root {
		#[arg(long)]
		signer: Address,
		/// Member digest; repeat in order
		#[arg(long = "digest", required = true)]
		digests: Vec<B256>,
	},
	/// Sign a Verify envelope over the digests and register its root
	RegisterRoot {
		/// Member digest; repeat in order
		#[arg(long = "digest", required = true)]
		digests: Vec<B256>,
		#[arg(long)]
		nonce: U256,
		/// Unix timestamp; defaults to one hour from now
		#[arg(long)]
		deadline: Option<U256>,
	},
	/// Recover the address that signed a digest
	Recover {
		#[arg(long)]
		digest: B256,
		#[arg(long)]
		signature: Bytes,
	},
	/// Check whether an owner's nonce has been consumed
	NonceUsed {
		#[arg(long)]
		owner: Address,
		#[arg(long)]
		nonce: U256,
	},
}

#[derive(Args, Debug)]
struct TransferArgs {
	/// ERC-20 token address
	#[arg(long)]
	token: Address,
	#[arg(long, default_value_t = 18)]
	decimals: u8,
	/// Decimal amount, e.g. 1.5
	#[arg(long)]
	amount: String,
	/// Defaults to the account's own address
	#[arg(long)]
	spender: Option<Address>,
	#[arg(long)]
	nonce: U256,
	/// Unix timestamp; defaults to one hour from now
	#[arg(long)]
	deadline: Option<U256>,
}

fn default_deadline(deadline: Option<U256>) -> U256 {
	deadline.unwrap_or_else(|| U256::from(current_timestamp() + DEFAULT_VALIDITY_SECS))
}

impl TransferArgs {
	fn details(&self, chain_id: u64) -> Result<TransferDetails, Box<dyn Error>> {
		let token = PlainAsset::new(chain_id, self.token, "", "", self.decimals);
		let amount = token.parse_amount(&self.amount)?;
		Ok(TransferDetails::plain(token, amount))
	}

	fn signature_transfer(
		&self,
		chain_id: u64,
		account: Address,
	) -> Result<SignatureTransfer, Box<dyn Error>> {
		Ok(SignatureTransfer {
			transfer_details: self.details(chain_id)?,
			spender: self.spender.unwrap_or(account),
			nonce: self.nonce,
			deadline: default_deadline(self.deadline),
		})
	}

	/// Intent and full-amount request for a transfer the account relays itself.
	///
	/// The contract pays out to the transaction sender, so the signed spender
	/// must be the account.
	fn relayed_transfer(
		&self,
		chain_id: u64,
		account: Address,
		to: Address,
	) -> Result<(SignatureTransfer, RequestedTransfer), Box<dyn Error>> {
		if let Some(spender) = self.spender.filter(|spender| *spender != account) {
			return Err(format!(
				"--spender {} cannot be used with transfer; the sender {} is the spender",
				spender, account
			)
			.into());
		}
		let token = PlainAsset::new(chain_id, self.token, "", "", self.decimals);
		let amount = token.parse_amount(&self.amount)?;
		let intent = SignatureTransfer {
			transfer_details: TransferDetails::plain(token, amount),
			spender: account,
			nonce: self.nonce,
			deadline: default_deadline(self.deadline),
		};
		Ok((intent, RequestedTransfer::amount(to, amount)))
	}
}

fn require_chain_id(chain_id: Option<u64>) -> Result<u64, Box<dyn Error>> {
	chain_id.ok_or_else(|| "--chain-id is required for this command".into())
}

/// Everything a command may need, built lazily from the configuration.
struct Client {
	config: Config,
	chain_id: Option<u64>,
}

impl Client {
	fn account(&self) -> Result<AccountService, Box<dyn Error>> {
		Ok(AccountService::from_config(
			&self.config.account.primary,
			self.config.account.primary_config()?,
		)?)
	}

	fn signer(&self, account: AccountService) -> Result<Permit3Signer, Box<dyn Error>> {
		let chain_id = require_chain_id(self.chain_id)?;
		let deployment = self.config.network(chain_id)?.deployment();
		Ok(Permit3Signer::new(
			account.into_shared(),
			deployment,
			Some(chain_id),
		))
	}

	fn submission(&self, account: &AccountService) -> Result<SubmissionService, Box<dyn Error>> {
		let chain_id = require_chain_id(self.chain_id)?;
		let network = self.config.network(chain_id)?;
		let client = AlloyChainClient::new(chain_id, network, account.private_key().as_ref())?;
		Ok(SubmissionService::new(
			Arc::new(client),
			network.deployment(),
		))
	}
}

async fn run(client: Client, command: Command) -> Result<(), Box<dyn Error>> {
	match command {
		Command::Address => {
			println!("{}", client.account()?.get_address().await?);
		},
		Command::TransferDigest {
			transfer,
			super_signature,
		} => {
			let chain_id = require_chain_id(client.chain_id)?;
			let account = client.account()?;
			let address = account.get_address().await?;
			let signer = client.signer(account)?;
			let digest = if super_signature {
				signer.super_transfer_digest(
					&transfer.details(chain_id)?,
					&transfer.spender.unwrap_or(address),
				)?
			} else {
				permit3_signing::transfer_digest(
					&signer.permit3_domain()?,
					&transfer.signature_transfer(chain_id, address)?,
				)
			};
			println!("{}", digest);
		},
		Command::SignTransfer(transfer) => {
			let chain_id = require_chain_id(client.chain_id)?;
			let account = client.account()?;
			let address = account.get_address().await?;
			let signed = client
				.signer(account)?
				.sign_transfer(transfer.signature_transfer(chain_id, address)?)
				.await?;
			println!("{}", serde_json::to_string_pretty(&signed)?);
		},
		Command::Transfer { transfer, to } => {
			let chain_id = require_chain_id(client.chain_id)?;
			let account = client.account()?;
			let address = account.get_address().await?;
			let (intent, requested) = transfer.relayed_transfer(chain_id, address, to)?;
			let submission = client.submission(&account)?;
			let signed = client.signer(account)?.sign_transfer(intent).await?;
			let result = submission
				.transfer_by_signature(&signed, &requested)
				.await?;
			println!("{}", result.hash);
		},
		Command::RegisterRoot {
			digests,
			nonce,
			deadline,
		} => {
			let account = client.account()?;
			let submission = client.submission(&account)?;
			let signed = client
				.signer(account)?
				.sign_verify(build_verify(digests, nonce, default_deadline(deadline)))
				.await?;
			let result = submission.register_root(&signed).await?;
			println!("root {}", signed.root);
			println!("tx {}", result.hash);
		},
		Command::NonceUsed { owner, nonce } => {
			let account = client.account()?;
			let used = client
				.submission(&account)?
				.is_nonce_used(owner, nonce)
				.await?;
			println!("{}", used);
		},
		// Answered before configuration is loaded.
		Command::Root { .. } | Command::Recover { .. } => {},
	}
	Ok(())
}

/// Output of commands that need neither configuration nor a chain.
fn offline_output(command: &Command) -> Result<Option<String>, Box<dyn Error>> {
	match command {
		Command::Root { signer, digests } => {
			Ok(Some(calculate_root(*signer, digests).to_string()))
		},
		Command::Recover { digest, signature } => {
			Ok(Some(recover_signer(digest, signature)?.to_string()))
		},
		_ => Ok(None),
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	if let Some(output) = offline_output(&cli.command)? {
		println!("{}", output);
		return Ok(());
	}

	let config = Config::from_file(&cli.config).await?;
	tracing::debug!(client_id = %config.client.id, "Loaded configuration");

	run(
		Client {
			config,
			chain_id: cli.chain_id,
		},
		cli.command,
	)
	.await
}

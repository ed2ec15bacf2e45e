//! Contract bindings for the Permit3 and ILRTA entry points.
//!
//! Permit3 exposes the same entry point names for plain and tagged transfer
//! details, so each detail shape gets its own interface. Within an interface
//! the single-transfer overload is `_0` and the batch overload is `_1`.

/// Permit3 entry points for plain `(token, amount)` details.
pub mod plain {
	alloy_sol_types::sol! {
		interface IPermit3 {
			struct TransferDetails { address token; uint256 amount; }
			struct SignatureTransfer { TransferDetails transferDetails; uint256 nonce; uint256 deadline; }
			struct SignatureTransferBatch { TransferDetails[] transferDetails; uint256 nonce; uint256 deadline; }
			struct RequestedTransfer { address to; uint256 amount; }

			function transferBySignature(
				address signer,
				SignatureTransfer signatureTransfer,
				RequestedTransfer requestedTransfer,
				bytes signature
			) external;

			function transferBySignature(
				address signer,
				SignatureTransferBatch signatureTransfer,
				RequestedTransfer[] requestedTransfer,
				bytes signature
			) external;

			function transferBySuperSignature(
				address signer,
				TransferDetails transferDetails,
				RequestedTransfer requestedTransfer,
				bytes32[] dataHash
			) external;

			function transferBySuperSignature(
				address signer,
				TransferDetails[] transferDetails,
				RequestedTransfer[] requestedTransfer,
				bytes32[] dataHash
			) external;
		}
	}
}

/// Permit3 entry points for tagged `(token, tokenType, functionSelector, bytes)` details.
pub mod tagged {
	alloy_sol_types::sol! {
		interface IPermit3 {
			struct TransferDetails { address token; uint8 tokenType; uint32 functionSelector; bytes transferDetails; }
			struct SignatureTransfer { TransferDetails transferDetails; uint256 nonce; uint256 deadline; }
			struct SignatureTransferBatch { TransferDetails[] transferDetails; uint256 nonce; uint256 deadline; }
			struct RequestedTransfer { address to; bytes transferDetails; }

			function transferBySignature(
				address signer,
				SignatureTransfer signatureTransfer,
				RequestedTransfer requestedTransfer,
				bytes signature
			) external;

			function transferBySignature(
				address signer,
				SignatureTransferBatch signatureTransfer,
				RequestedTransfer[] requestedTransfer,
				bytes signature
			) external;

			function transferBySuperSignature(
				address signer,
				TransferDetails transferDetails,
				RequestedTransfer requestedTransfer,
				bytes32[] dataHash
			) external;

			function transferBySuperSignature(
				address signer,
				TransferDetails[] transferDetails,
				RequestedTransfer[] requestedTransfer,
				bytes32[] dataHash
			) external;
		}
	}
}

/// Root registration and nonce bookkeeping on the Permit3 contract.
pub mod super_signature {
	alloy_sol_types::sol! {
		interface IPermit3 {
			struct Verify { bytes32[] dataHash; uint256 nonce; uint256 deadline; }

			function verifyAndStoreRoot(address signer, Verify verify, bytes signature) external;

			function nonceBitmap(address owner, uint256 word) external view returns (uint256);
		}
	}
}

/// Entry points of an ILRTA asset contract. Details are ABI-encoded bytes
/// whose layout only the asset understands.
pub mod ilrta {
	alloy_sol_types::sol! {
		interface IILRTA {
			struct SignatureTransfer { bytes transferDetails; uint256 nonce; uint256 deadline; }
			struct RequestedTransfer { address to; bytes transferDetails; }

			function transferBySignature(
				address signer,
				SignatureTransfer signatureTransfer,
				RequestedTransfer requestedTransfer,
				bytes signature
			) external;

			function transferBySuperSignature(
				address signer,
				bytes transferDetails,
				RequestedTransfer requestedTransfer,
				bytes32[] dataHash
			) external;
		}
	}
}

//! Calldata for LSP7 and LSP8 `transfer` calls

use ethers::abi::{encode, Token};
use ethers::types::{Address, H256, U256};
use ethers::utils::id;

use crate::shared::constants::{LSP7_TRANSFER_SIGNATURE, LSP8_TRANSFER_SIGNATURE};

fn with_selector(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = id(signature).to_vec();
    data.extend(encode(args));
    data
}

/// `transfer(address from, address to, uint256 amount, bool force, bytes data)`
pub fn encode_lsp7_transfer(from: Address, to: Address, amount: U256) -> Vec<u8> {
    with_selector(
        LSP7_TRANSFER_SIGNATURE,
        &[
            Token::Address(from),
            Token::Address(to),
            Token::Uint(amount),
            Token::Bool(true),
            Token::Bytes(Vec::new()),
        ],
    )
}

/// `transfer(address from, address to, bytes32 tokenId, bool force, bytes data)`
pub fn encode_lsp8_transfer(from: Address, to: Address, token_id: H256) -> Vec<u8> {
    with_selector(
        LSP8_TRANSFER_SIGNATURE,
        &[
            Token::Address(from),
            Token::Address(to),
            Token::FixedBytes(token_id.as_bytes().to_vec()),
            Token::Bool(true),
            Token::Bytes(Vec::new()),
        ],
    )
}

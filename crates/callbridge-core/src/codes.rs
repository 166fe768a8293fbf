//! Built-in status code table for the credential-exchange SDK.
//!
//! Covers the library's code families; it is not exhaustive. Codes missing
//! here translate to [`ErrorKind::Unidentified`](crate::ErrorKind::Unidentified).

use crate::translate::ErrorDescriptor as E;

pub static SDK_ERRORS: &[E] = &[
    E::new(0, "Success", "Success"),
    // Common
    E::new(100, "CommonInvalidParam1", "Caller passed invalid value as param 1"),
    E::new(101, "CommonInvalidParam2", "Caller passed invalid value as param 2"),
    E::new(102, "CommonInvalidParam3", "Caller passed invalid value as param 3"),
    E::new(103, "CommonInvalidParam4", "Caller passed invalid value as param 4"),
    E::new(104, "CommonInvalidParam5", "Caller passed invalid value as param 5"),
    E::new(105, "CommonInvalidParam6", "Caller passed invalid value as param 6"),
    E::new(106, "CommonInvalidParam7", "Caller passed invalid value as param 7"),
    E::new(107, "CommonInvalidParam8", "Caller passed invalid value as param 8"),
    E::new(108, "CommonInvalidParam9", "Caller passed invalid value as param 9"),
    E::new(109, "CommonInvalidParam10", "Caller passed invalid value as param 10"),
    E::new(110, "CommonInvalidParam11", "Caller passed invalid value as param 11"),
    E::new(111, "CommonInvalidParam12", "Caller passed invalid value as param 12"),
    E::new(112, "CommonInvalidState", "Invalid library state was detected in runtime"),
    E::new(113, "CommonInvalidStructure", "Object passed by library caller has invalid structure"),
    E::new(114, "CommonIOError", "IO error"),
    // Wallet
    E::new(200, "WalletInvalidHandle", "Caller passed invalid wallet handle"),
    E::new(201, "WalletUnknownTypeError", "Unknown type of wallet was passed on create_wallet"),
    E::new(202, "WalletTypeAlreadyRegisteredError", "Attempt to register already existing wallet type"),
    E::new(203, "WalletAlreadyExistsError", "Attempt to create wallet with name used for another existing wallet"),
    E::new(204, "WalletNotFoundError", "Requested entity id isn't present in wallet"),
    E::new(205, "WalletIncompatiblePoolError", "Trying to use wallet with pool that has different name"),
    E::new(206, "WalletAlreadyOpenedError", "Trying to open wallet that was opened already"),
    E::new(207, "WalletAccessFailed", "Attempt to open encrypted wallet with invalid credentials"),
    E::new(208, "WalletInputError", "Input provided to wallet operations is considered not valid"),
    E::new(209, "WalletDecodingError", "Decoding of wallet data during input/output failed"),
    E::new(210, "WalletStorageError", "Storage error occurred during wallet operation"),
    E::new(211, "WalletEncryptionError", "Error during encryption-related operations"),
    E::new(212, "WalletItemNotFound", "Requested wallet item not found"),
    E::new(213, "WalletItemAlreadyExists", "Wallet record with this name already exists"),
    E::new(214, "WalletQueryError", "Provided wallet query is invalid"),
    // Pool and ledger
    E::new(300, "PoolLedgerNotCreatedError", "Trying to open pool ledger that wasn't created before"),
    E::new(301, "PoolLedgerInvalidPoolHandle", "Caller passed invalid pool ledger handle"),
    E::new(302, "PoolLedgerTerminated", "Pool ledger terminated"),
    E::new(303, "LedgerNoConsensusError", "No consensus during ledger operation"),
    E::new(304, "LedgerInvalidTransaction", "Attempt to parse invalid transaction response"),
    E::new(305, "LedgerSecurityError", "Attempt to send transaction without the necessary privileges"),
    E::new(306, "PoolLedgerConfigAlreadyExistsError", "Pool ledger config with this name already exists"),
    E::new(307, "PoolLedgerTimeout", "Timeout for action"),
    E::new(308, "PoolIncompatibleProtocolVersion", "Genesis transactions are not compatible with the protocol version"),
    E::new(309, "LedgerNotFound", "Item not found on ledger"),
    // Anoncreds
    E::new(400, "AnoncredsRevocationRegistryFullError", "Revocation registry is full"),
    E::new(401, "AnoncredsInvalidUserRevocId", "Invalid user revocation id"),
    E::new(404, "AnoncredsMasterSecretDuplicateNameError", "Attempt to generate master secret with duplicated name"),
    E::new(405, "AnoncredsProofRejected", "Proof rejected"),
    E::new(406, "AnoncredsCredentialRevoked", "Credential revoked"),
    E::new(407, "AnoncredsCredDefAlreadyExistsError", "Credential definition already exists for this schema"),
    // Crypto and DID
    E::new(500, "UnknownCryptoTypeError", "Unknown format of DID entity keys"),
    E::new(600, "DidAlreadyExistsError", "Attempt to create duplicate did"),
    // Payments
    E::new(700, "UnknownPaymentMethod", "Unknown payment method was given"),
    E::new(701, "IncompatiblePaymentError", "No method or more than one method was scraped from inputs/outputs"),
    E::new(702, "PaymentInsufficientFundsError", "Insufficient funds on inputs"),
    E::new(703, "PaymentSourceDoesNotExistError", "No such source on a ledger"),
    E::new(704, "PaymentOperationNotSupportedError", "Operation is not supported for payment method"),
    E::new(705, "PaymentExtraFundsError", "Extra funds on inputs"),
    // Higher-level SDK
    E::new(1001, "UnknownError", "Unknown Error"),
    E::new(1002, "ConnectionError", "Error with Connection"),
    E::new(1003, "InvalidConnectionHandle", "Invalid Connection Handle"),
    E::new(1004, "InvalidConfiguration", "Invalid Configuration"),
    E::new(1005, "NotReady", "Object not ready for specified action"),
    E::new(1006, "NoEndpoint", "No Endpoint set for Connection Object"),
    E::new(1007, "InvalidOption", "Invalid Option"),
    E::new(1008, "InvalidDid", "Invalid DID"),
    E::new(1009, "InvalidVerkey", "Invalid VERKEY"),
    E::new(1010, "PostMsgFailure", "Message failed in post"),
    E::new(1016, "InvalidJson", "Invalid JSON string"),
    E::new(1017, "InvalidProofHandle", "Invalid Proof Handle"),
    E::new(1023, "InvalidProof", "Proof had invalid format"),
    E::new(1030, "NoPoolOpen", "No Pool open"),
    E::new(1031, "InvalidSchema", "Schema was invalid or corrupt"),
    E::new(1035, "UnknownLibindyError", "Unknown libindy error"),
    E::new(1038, "CallbackTimeout", "Waiting for callback timed out"),
    E::new(1048, "InvalidObjHandle", "Obj was not found with handle"),
    E::new(1050, "SerializationError", "Unable to serialize"),
    E::new(1057, "InvalidWalletHandle", "Invalid Wallet or Search Handle"),
    E::new(1072, "DuplicateWalletRecord", "Record already exists in the wallet"),
    E::new(1073, "WalletRecordNotFound", "Wallet record not found"),
    E::new(1081, "InvalidState", "Object is in invalid state for requested operation"),
    E::new(1085, "ThreadError", "Unable to create thread"),
    E::new(1090, "LoggingError", "Logging Error"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sdk_codes_are_unique() {
        let mut seen = HashSet::new();
        for descriptor in SDK_ERRORS {
            assert!(seen.insert(descriptor.code), "duplicate code {}", descriptor.code);
        }
    }

    #[test]
    fn test_sdk_table_starts_with_success() {
        assert_eq!(SDK_ERRORS[0].code, 0);
        assert_eq!(SDK_ERRORS[0].name, "Success");
    }
}

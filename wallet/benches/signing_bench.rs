// Signing and envelope benchmarks for the TokenD wallet.
//
// Covers key generation, raw Ed25519 signing, transaction hashing, building
// and signing a full transaction, and decoding envelopes of growing size.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tokend_wallet::account::Account;
use tokend_wallet::network::{FixedClock, NetworkParams};
use tokend_wallet::strkey;
use tokend_wallet::transaction::{FixedSalt, Transaction, TransactionBuilder};
use tokend_wallet::xdr::{
    FeeData, ManageBalanceOp, Memo, OperationBody, PaymentFeeData, PaymentOp, PublicKey,
};

fn network() -> NetworkParams {
    NetworkParams::new("Example Test Network").unwrap()
}

fn payment(to: PublicKey) -> OperationBody {
    OperationBody::Payment(PaymentOp::simple(
        PublicKey::Ed25519([1u8; 32]),
        to,
        1_000_000,
        PaymentFeeData::new(FeeData::new(0, 0), FeeData::new(0, 0), false),
        "Benchmark payment",
    ))
}

fn build(signer: &Account, operations: usize) -> Transaction {
    let clock = FixedClock(1_700_000_000);
    TransactionBuilder::new(network(), signer.public_key_xdr())
        .add_operations((0..operations).map(|_| payment(signer.public_key_xdr())))
        .memo(Memo::Id(42))
        .clock(&clock)
        .salt_source(&FixedSalt(7))
        .add_signer(signer)
        .build()
        .unwrap()
}

fn bench_account_generation(c: &mut Criterion) {
    c.bench_function("account/random", |b| {
        b.iter(Account::random);
    });
}

fn bench_strkey(c: &mut Criterion) {
    let account = Account::random();
    let account_id = account.account_id();

    c.bench_function("strkey/encode_account_id", |b| {
        b.iter(|| strkey::encode_account_id(&account.public_key_bytes()));
    });
    c.bench_function("strkey/decode_account_id", |b| {
        b.iter(|| strkey::decode_account_id(&account_id).unwrap());
    });
}

fn bench_sign_hash(c: &mut Criterion) {
    let account = Account::random();
    let hash = [0xABu8; 32];

    c.bench_function("ed25519/sign_hash", |b| {
        b.iter(|| account.sign_decorated(&hash).unwrap());
    });
}

fn bench_build_and_sign(c: &mut Criterion) {
    let signer = Account::random();

    c.bench_function("transaction/build_sign_manage_balance", |b| {
        b.iter(|| {
            TransactionBuilder::new(network(), signer.public_key_xdr())
                .add_operation(OperationBody::ManageBalance(ManageBalanceOp::create(
                    signer.public_key_xdr(),
                    "OLG",
                )))
                .add_signer(&signer)
                .build()
                .unwrap()
        });
    });
}

fn bench_envelope_sizes(c: &mut Criterion) {
    let signer = Account::random();
    let mut group = c.benchmark_group("envelope");

    for operations in [1usize, 10, 100] {
        let tx = build(&signer, operations);
        let encoded = tx.to_base64().unwrap();
        group.throughput(Throughput::Elements(operations as u64));

        group.bench_with_input(BenchmarkId::new("hash", operations), &tx, |b, tx| {
            b.iter(|| tx.hash().unwrap());
        });
        group.bench_with_input(
            BenchmarkId::new("decode", operations),
            &encoded,
            |b, encoded| {
                b.iter(|| Transaction::from_base64(network(), encoded).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_account_generation,
    bench_strkey,
    bench_sign_hash,
    bench_build_and_sign,
    bench_envelope_sizes,
);
criterion_main!(benches);

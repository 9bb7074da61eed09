//! Performance benchmarks for forgetmenot-companion
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use forgetmenot_companion::codec::{self, MessageKeys};
use forgetmenot_companion::payload::decode_configuration;
use forgetmenot_companion::{
    Configuration, DeviceMessage, MemoryTransport, MessageDispatcher, TimeValue,
};

const PAYLOAD: &str = "%7B%22messageText%22%3A%22Did%20you%20take%20your%20pills%3F%22%2C%22time%22%3A86400%7D";

fn bench_payload_decode(c: &mut Criterion) {
    c.bench_function("decode_configuration", |b| {
        b.iter(|| decode_configuration(PAYLOAD).unwrap());
    });
}

fn bench_dictionary_encode(c: &mut Criterion) {
    let message = DeviceMessage::from(Configuration::new(
        "Did you take your pills?",
        Some(TimeValue::Integer(86_400)),
    ));
    let keys = MessageKeys::default();

    c.bench_function("codec::encode", |b| {
        b.iter(|| codec::encode(&message, &keys).unwrap());
    });

    let encoded = codec::encode(&message, &keys).unwrap();
    c.bench_function("codec::decode", |b| {
        b.iter(|| codec::decode(&encoded).unwrap());
    });
}

fn bench_memory_send(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("MemoryTransport send + outcome", |b| {
        b.to_async(&rt).iter(|| async {
            let dispatcher = MessageDispatcher::new(MemoryTransport::auto_deliver());
            dispatcher
                .send(Configuration::new("Stretch", Some(TimeValue::Integer(60))))
                .await
                .outcome()
                .await
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_payload_decode,
    bench_dictionary_encode,
    bench_memory_send,
);
criterion_main!(benches);

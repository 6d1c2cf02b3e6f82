use campus_portal::auth::{Identity, PasswordHasher, TokenIssuer, TokenVerifier, UserRole};
use chrono::Duration;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const SECRET: &[u8] = b"bench-secret";

fn identity() -> Identity {
    Identity {
        id: "0b5b5c1e-8d0a-4c33-b7f4-0a9b3f7c9e21".to_string(),
        email: "student@campus.edu".to_string(),
        name: "Bench Student".to_string(),
        roll_no: Some("CS2024001".to_string()),
        department: Some("Computer Science".to_string()),
        role: UserRole::Student,
    }
}

fn bench_tokens(c: &mut Criterion) {
    let issuer = TokenIssuer::new(
        SECRET,
        Duration::days(7),
        "university-system",
        "university-students",
    );
    let verifier = TokenVerifier::new(SECRET)
        .with_issuer("university-system")
        .with_audience("university-students");
    let identity = identity();
    let token = issuer.issue(&identity).unwrap();

    c.bench_function("token_issue", |b| {
        b.iter(|| issuer.issue(black_box(&identity)))
    });

    c.bench_function("token_verify", |b| {
        b.iter(|| verifier.verify(black_box(&token)))
    });

    let mut tampered = token.clone();
    tampered.push('x');
    c.bench_function("token_verify_bad_signature", |b| {
        b.iter(|| verifier.verify(black_box(&tampered)))
    });
}

fn bench_passwords(c: &mut Criterion) {
    let mut group = c.benchmark_group("bcrypt");
    group.sample_size(10);

    for cost in [4u32, 10] {
        let hasher = PasswordHasher::new(cost).unwrap();
        let hashed = hasher.hash("password123").unwrap();

        group.bench_function(format!("hash_cost_{}", cost), |b| {
            b.iter(|| hasher.hash(black_box("password123")))
        });
        group.bench_function(format!("verify_cost_{}", cost), |b| {
            b.iter(|| hasher.verify(black_box("password123"), black_box(&hashed)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tokens, bench_passwords);
criterion_main!(benches);

// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use repo_insights::{
    RawResponse, Resource, classify, normalize_commit_frequency, normalize_commits,
    normalize_issues,
};
use serde_json::{Value, json};

fn commit_page(size: usize,) -> Value
{
    Value::Array(
        (0..size)
            .map(|i| {
                json!({
                    "sha": format!("{i:040x}"),
                    "commit": {
                        "message": format!("commit number {i}"),
                        "author": { "name": "The Octocat", "date": "2024-05-01T10:00:00Z" }
                    }
                })
            },)
            .collect(),
    )
}

fn benchmark_normalize_commits(c: &mut Criterion,)
{
    let small = commit_page(5,);
    let large = commit_page(100,);

    c.bench_function("normalize_commits_5", |b| {
        b.iter(|| normalize_commits(black_box(&small,),),)
    },);
    c.bench_function("normalize_commits_100", |b| {
        b.iter(|| normalize_commits(black_box(&large,),),)
    },);
}

fn benchmark_commit_frequency(c: &mut Criterion,)
{
    let year = Value::Array(
        (0..52_i64)
            .map(|i| json!({ "week": 1_700_000_000 + i * 604_800, "total": i, "days": [0, 1, 2, 3, 4, 5, 6] }))
            .collect(),
    );

    c.bench_function("normalize_commit_frequency_52_weeks", |b| {
        b.iter(|| {
            let points = normalize_commit_frequency(black_box(&year,),);
            black_box(points.len(),)
        },)
    },);
}

fn benchmark_issue_filtering(c: &mut Criterion,)
{
    let mixed = Value::Array(
        (0..100_u64)
            .map(|i| {
                if i % 2 == 0 {
                    json!({ "title": format!("pull {i}"), "number": i, "pull_request": { "url": "https://api.github.com" } })
                } else {
                    json!({ "title": format!("issue {i}"), "number": i, "user": { "login": "octocat" } })
                }
            },)
            .collect(),
    );

    c.bench_function("normalize_issues_mixed_100", |b| {
        b.iter(|| normalize_issues(black_box(&mixed,), black_box(5,),),)
    },);
}

fn benchmark_classify(c: &mut Criterion,)
{
    let success = RawResponse {
        status:               200,
        rate_limit_remaining: Some("4999".to_owned(),),
        body:                 commit_page(5,).to_string(),
    };
    let limited = RawResponse {
        status:               403,
        rate_limit_remaining: Some("0".to_owned(),),
        body:                 r#"{"message":"API rate limit exceeded"}"#.to_owned(),
    };

    c.bench_function("classify_commit_page", |b| {
        b.iter(|| classify(Resource::Commits, black_box(&success,),),)
    },);
    c.bench_function("classify_rate_limited", |b| {
        b.iter(|| classify(Resource::Metadata, black_box(&limited,),),)
    },);
}

criterion_group!(
    benches,
    benchmark_normalize_commits,
    benchmark_commit_frequency,
    benchmark_issue_filtering,
    benchmark_classify
);
criterion_main!(benches);

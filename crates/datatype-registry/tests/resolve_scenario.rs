// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end resolution scenarios against the in-process backend.

use datatype_registry::{
    opaque_wire_type, BuiltinKind, CommBackend, Datatype, LoopbackBackend, RegistryConfig,
    Resolver, TypeKey,
};
use std::sync::{Arc, Barrier};
use std::thread;

#[derive(Clone, Copy)]
#[allow(dead_code)]
struct MyStruct {
    a: u64,
    b: f64,
    c: i64,
}

#[derive(Clone, Copy)]
#[allow(dead_code)]
struct Tuple3 {
    row: i64,
    col: i64,
    val: f64,
}

#[derive(Clone, Copy)]
#[allow(dead_code)]
struct Fresh {
    x: [u32; 5],
}

opaque_wire_type!(MyStruct, Tuple3, Fresh);

#[test]
fn test_builtin_then_aggregate_then_finalize() {
    let backend = Arc::new(LoopbackBackend::new());
    {
        let resolver = Resolver::new(backend.clone());

        let int32 = resolver.resolve::<i32>().expect("i32");
        assert_eq!(int32, backend.builtin(BuiltinKind::I32));
        assert!(resolver.cache().is_empty());

        let first = resolver.resolve::<MyStruct>().expect("MyStruct");
        assert!(backend.is_committed(first));
        assert_eq!(backend.size_of(first), Some(24));

        let second = resolver.resolve::<MyStruct>().expect("MyStruct");
        assert_eq!(first, second);
        assert_eq!(backend.counters().committed, 1);

        backend.finalize();
    }
    // Cache dropped after finalization: no free attempted
    assert_eq!(backend.counters().free_attempts, 0);
    assert_eq!(backend.counters().freed, 0);
}

#[test]
fn test_builtins_never_enter_the_cache() {
    let backend = Arc::new(LoopbackBackend::new());
    let resolver = Resolver::new(backend.clone());

    for _ in 0..3 {
        assert_eq!(resolver.resolve::<u8>().expect("u8"), backend.builtin(BuiltinKind::U8));
        assert_eq!(resolver.resolve::<i16>().expect("i16"), backend.builtin(BuiltinKind::I16));
        assert_eq!(resolver.resolve::<u32>().expect("u32"), backend.builtin(BuiltinKind::U32));
        assert_eq!(resolver.resolve::<f32>().expect("f32"), backend.builtin(BuiltinKind::F32));
        assert_eq!(resolver.resolve::<bool>().expect("bool"), backend.builtin(BuiltinKind::Bool));
    }

    assert!(!resolver.cache().contains(&TypeKey::of::<u8>()));
    assert!(resolver.cache().is_empty());
    assert_eq!(resolver.cache().stats().misses, 0);
}

#[test]
fn test_clear_then_get_reports_not_found() {
    let backend = Arc::new(LoopbackBackend::new());
    let resolver = Resolver::new(backend.clone());
    let key = TypeKey::of::<Tuple3>();

    resolver.resolve::<Tuple3>().expect("Tuple3");
    assert!(resolver.cache().get(&key).is_some());

    resolver.cache().clear();
    assert_eq!(resolver.cache().get(&key), None);
    assert_eq!(backend.live_count(), 0);
}

#[test]
fn test_concurrent_first_resolution_commits_once() {
    let backend = Arc::new(LoopbackBackend::new());
    let resolver = Arc::new(Resolver::with_config(
        backend.clone(),
        &RegistryConfig::default().with_initial_capacity(4),
    ));
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                resolver.resolve::<Fresh>().expect("Fresh")
            })
        })
        .collect();

    let seen: Vec<Datatype> = handles
        .into_iter()
        .map(|h| h.join().expect("thread should succeed"))
        .collect();

    assert!(seen.iter().all(|dt| *dt == seen[0]));
    assert_eq!(backend.counters().constructed, 1);
    assert_eq!(backend.counters().committed, 1);
    assert_eq!(backend.live_count(), 1);
}

//! Stress test - signal handler and thread producers on one ring
//!
//! A SIGALRM handler (the "interrupt") and a producer thread both write
//! sequence-numbered blocks into a shared ring. The main thread drains with
//! `queue_get` and `get`, checks every byte and frees. Any overlap, lost
//! block or reordering shows up as a verification failure.
//!
//! Usage: `stress [seconds]`. Ring size comes from `RBB_CAPACITY` /
//! `RBB_MAX_BLOCKS`, the alarm period from `RBB_STRESS_TICK_US`.

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use rbb::{create_ring, env_get, kerror, kinfo, kwarn, HostRing, RbbConfig};

const SOURCE_IRQ: u8 = 0xA1;
const SOURCE_THREAD: u8 = 0x7E;

/// Source tag plus little-endian sequence number
const HEADER_LEN: usize = 9;

/// Largest batch taken by one `queue_get`
const MAX_DRAIN: usize = 4096;

static RING: OnceLock<HostRing<'static>> = OnceLock::new();
static IRQ_SEQ: AtomicU64 = AtomicU64::new(0);
static IRQ_DROPPED: AtomicU64 = AtomicU64::new(0);

fn block_len(seq: u64) -> usize {
    HEADER_LEN + (seq % 55) as usize
}

fn fill(bytes: &mut [u8], source: u8, seq: u64) {
    bytes[0] = source;
    bytes[1..HEADER_LEN].copy_from_slice(&seq.to_le_bytes());
    for (i, b) in bytes[HEADER_LEN..].iter_mut().enumerate() {
        *b = (seq as u8).wrapping_add(i as u8);
    }
}

/// Write one block; `false` when the ring is full
fn produce(ring: &HostRing<'static>, source: u8, seq: u64) -> bool {
    match ring.allocate(block_len(seq)) {
        Some(mut block) => {
            fill(ring.block_bytes_mut(&mut block), source, seq);
            ring.put(block);
            true
        }
        None => false,
    }
}

extern "C" fn on_alarm(_sig: libc::c_int) {
    let Some(ring) = RING.get() else {
        return;
    };
    let seq = IRQ_SEQ.load(Ordering::Relaxed);
    if produce(ring, SOURCE_IRQ, seq) {
        IRQ_SEQ.store(seq + 1, Ordering::Relaxed);
    } else {
        IRQ_DROPPED.fetch_add(1, Ordering::Relaxed);
    }
}

fn install_alarm(tick: Duration) -> nix::Result<()> {
    let action = SigAction::new(SigHandler::Handler(on_alarm), SaFlags::SA_RESTART, SigSet::empty());
    // Safety: the handler only touches atomics and the ring, whose
    // operations mask signals and never block
    unsafe { sigaction(Signal::SIGALRM, &action)? };
    set_timer(tick);
    Ok(())
}

/// Disarm the timer and discard any alarm still pending
fn stop_alarm() -> nix::Result<()> {
    set_timer(Duration::ZERO);
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    // Safety: SIG_IGN installs no code
    unsafe { sigaction(Signal::SIGALRM, &ignore)? };
    Ok(())
}

fn set_timer(tick: Duration) {
    let tv = libc::timeval {
        tv_sec: tick.as_secs() as _,
        tv_usec: tick.subsec_micros() as _,
    };
    let timer = libc::itimerval {
        it_interval: tv,
        it_value: tv,
    };
    // Safety: plain syscall on valid stack memory
    unsafe {
        libc::setitimer(libc::ITIMER_REAL, &timer, ptr::null_mut());
    }
}

/// Per-source verification state
struct Checker {
    next_irq: u64,
    next_thread: u64,
    bytes: u64,
}

impl Checker {
    /// Verify one block, in order for its source
    fn block(&mut self, bytes: &[u8]) {
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[1..HEADER_LEN]);
        let seq = u64::from_le_bytes(word);

        let next = match bytes[0] {
            SOURCE_IRQ => &mut self.next_irq,
            SOURCE_THREAD => &mut self.next_thread,
            other => panic!("corrupt block: source tag {:#x}", other),
        };
        assert_eq!(seq, *next, "block out of order for source {:#x}", bytes[0]);
        assert_eq!(bytes.len(), block_len(seq), "block {} has wrong length", seq);

        let mut expected = vec![0u8; bytes.len()];
        fill(&mut expected, bytes[0], seq);
        assert_eq!(bytes, &expected[..], "block {} corrupted", seq);

        *next += 1;
        self.bytes += bytes.len() as u64;
    }

    /// Verify a queue span by walking its blocks
    fn span(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[1..HEADER_LEN]);
            let len = block_len(u64::from_le_bytes(word));
            self.block(&bytes[..len]);
            bytes = &bytes[len..];
        }
    }
}

/// One drain pass; returns blocks consumed
fn drain(ring: &HostRing<'static>, checker: &mut Checker, round: u64) -> usize {
    if round % 4 == 0 {
        return ring.drain(|bytes| checker.block(bytes));
    }
    let queue = ring.queue_get(MAX_DRAIN);
    let n = queue.block_count();
    checker.span(ring.queue_bytes(&queue));
    ring.queue_free(queue);
    n
}

fn main() {
    println!("=== RBB Stress Test ===\n");

    let seconds: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);
    let tick = Duration::from_micros(env_get("RBB_STRESS_TICK_US", 100));

    let config = RbbConfig::from_env();
    let ring = match create_ring(&config) {
        Ok(ring) => ring,
        Err(e) => {
            kerror!("stress: {}", e);
            std::process::exit(1);
        }
    };
    println!("Ring: {} bytes, {} blocks", ring.capacity(), ring.max_blocks());
    println!("Alarm every {:?}, running {}s\n", tick, seconds);

    let _ = RING.set(ring);
    let ring = RING.get().expect("ring installed");

    if let Err(e) = install_alarm(tick) {
        kerror!("stress: sigaction failed: {}", e);
        std::process::exit(1);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let producer = {
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut seq = 0u64;
            let mut full = 0u64;
            while !stop.load(Ordering::Relaxed) {
                if produce(ring, SOURCE_THREAD, seq) {
                    seq += 1;
                } else {
                    full += 1;
                    std::thread::yield_now();
                }
            }
            (seq, full)
        })
    };

    let mut checker = Checker {
        next_irq: 0,
        next_thread: 0,
        bytes: 0,
    };
    let start = Instant::now();
    let deadline = start + Duration::from_secs(seconds);
    let mut round = 0u64;
    let mut idle = 0u64;

    while Instant::now() < deadline {
        if drain(ring, &mut checker, round) == 0 {
            idle += 1;
            std::thread::yield_now();
        }
        round += 1;
        if round % 100_000 == 0 {
            print!("\rBlocks: {}", checker.next_irq + checker.next_thread);
        }
    }

    if let Err(e) = stop_alarm() {
        kwarn!("stress: could not stop alarm: {}", e);
    }
    stop.store(true, Ordering::Relaxed);
    let (thread_sent, thread_full) = producer.join().expect("producer panicked");
    while drain(ring, &mut checker, round) > 0 {
        round += 1;
    }
    let elapsed = start.elapsed();

    let stats = ring.stats();
    if stats.live_blocks != 0 {
        kwarn!("stress: {} blocks still live after final drain", stats.live_blocks);
    }
    assert_eq!(checker.next_thread, thread_sent, "thread blocks lost");
    assert_eq!(checker.next_irq, IRQ_SEQ.load(Ordering::Relaxed), "irq blocks lost");

    let blocks = checker.next_irq + checker.next_thread;
    println!("\n\n=== Results ===");
    println!("IRQ blocks:      {}", checker.next_irq);
    println!("IRQ dropped:     {}", IRQ_DROPPED.load(Ordering::Relaxed));
    println!("Thread blocks:   {}", checker.next_thread);
    println!("Thread retries:  {}", thread_full);
    println!("Idle polls:      {}", idle);
    println!("Bytes verified:  {}", checker.bytes);
    println!("Elapsed:         {:?}", elapsed);
    println!(
        "Throughput:      {:.0} blocks/sec, {:.1} MB/s",
        blocks as f64 / elapsed.as_secs_f64(),
        checker.bytes as f64 / elapsed.as_secs_f64() / 1e6
    );
    kinfo!("stress: verified {} blocks", blocks);

    println!("\n=== Stress Test Complete ===");
}

use kernel_sync::{WriteOnce, WriteOnceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn empty_cell_reads_none() {
    let cell = WriteOnce::<u32>::new();
    assert!(cell.get().is_none());
    assert!(!cell.is_sealed());
    assert!(!cell.is_poisoned());
}

#[test]
fn first_write_seals_and_second_is_refused() {
    let cell = WriteOnce::new();
    assert_eq!(cell.write(7u32), Ok(&7));
    assert!(cell.is_sealed());
    assert_eq!(cell.write(8), Err(WriteOnceError::AlreadyWritten));
    assert_eq!(cell.get(), Some(&7));
}

#[test]
fn failed_initializer_poisons_the_cell() {
    let cell = WriteOnce::<u32>::new();
    let res = cell.try_write_with(|| Err::<u32, _>("incomplete"));
    assert_eq!(res, Err(WriteOnceError::Init("incomplete")));
    assert!(cell.is_poisoned());
    assert!(cell.get().is_none());

    // No second chance, and the initializer does not even run.
    let res = cell.try_write_with::<&str>(|| panic!("must not run"));
    assert_eq!(res, Err(WriteOnceError::Poisoned));
}

#[test]
fn racing_writers_run_exactly_one_initializer() {
    let threads = 8;
    let cell = Arc::new(WriteOnce::<usize>::new());
    let runs = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let cell = Arc::clone(&cell);
            let runs = Arc::clone(&runs);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                cell.try_write_with::<()>(|| {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(i)
                })
                .is_ok()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(cell.get().is_some());
}

#[test]
fn sealed_value_is_dropped_with_the_cell() {
    let witness = Arc::new(());
    {
        let cell = WriteOnce::new();
        cell.write(Arc::clone(&witness)).unwrap();
        assert_eq!(Arc::strong_count(&witness), 2);
    }
    assert_eq!(Arc::strong_count(&witness), 1);
}

//! List behaviour over shared fixtures and arena-allocated records.

use weft_arena::Arena;
use weft_list::{link_adapter, Cursor, Link, List, ListError};
use weft_test_utils::{ids, ids_rev, init_tracing, items, ByOrder, ByPriority, Item};

#[test]
fn push_remove_pop_keeps_order() {
    init_tracing();
    let xs = items(3);
    let (a, b, c) = (&xs[0], &xs[1], &xs[2]);
    let mut list = List::<ByOrder>::new();
    list.push_back(a);
    list.push_back(b);
    list.push_back(c);
    assert_eq!(ids(&list), [0, 1, 2]);

    list.remove(b);
    assert_eq!(ids(&list), [0, 2]);

    let popped = list.pop_front().map(|item| item.id);
    assert_eq!(popped, Some(0));
    assert_eq!(ids(&list), [2]);
    assert_eq!(list.len(), 1);
    assert!(!list.is_empty());
}

#[test]
fn reverse_traversal_is_exact_reverse() {
    let xs = items(6);
    let mut list = List::<ByOrder>::new();
    for (i, item) in xs.iter().enumerate() {
        if i % 2 == 0 {
            list.push_back(item);
        } else {
            list.push_front(item);
        }
    }
    let mut forward = ids(&list);
    forward.reverse();
    assert_eq!(forward, ids_rev(&list));
}

#[test]
fn one_record_in_two_lists_by_different_members() {
    let xs = items(4);
    let mut order = List::<ByOrder>::new();
    let mut priority = List::<ByPriority>::new();
    for item in &xs {
        order.push_back(item);
    }
    let mut by_weight: Vec<&Item> = xs.iter().collect();
    by_weight.sort_by_key(|item| std::cmp::Reverse(item.weight));
    for item in by_weight {
        priority.push_back(item);
    }
    assert_eq!(ids(&order), [0, 1, 2, 3]);
    assert_eq!(ids(&priority), [3, 2, 1, 0]);

    priority.remove(&xs[2]);
    assert!(order.contains(&xs[2]));
    assert!(!priority.contains(&xs[2]));
}

#[test]
fn for_each_yields_n_then_none() {
    let xs = items(5);
    let mut list = List::<ByOrder>::new();
    xs.iter().for_each(|item| list.push_back(item));

    let mut cursor = Cursor::new();
    let mut count = 0;
    while list.for_each(&mut cursor).is_some() {
        count += 1;
    }
    assert_eq!(count, 5);
    assert!(list.for_each(&mut cursor).is_none());
}

#[test]
fn cursor_from_another_list_is_a_contract_violation() {
    let xs = items(2);
    let mut a = List::<ByOrder>::new();
    let mut b = List::<ByOrder>::new();
    a.push_back(&xs[0]);
    b.push_back(&xs[1]);
    let mut cursor = Cursor::new();
    a.for_each(&mut cursor);
    let err = b.try_for_each(&mut cursor).unwrap_err();
    assert!(matches!(err, ListError::CursorMismatch { .. }));
}

struct Event<'s> {
    name: &'s str,
    seq: u64,
    link: Link,
}

link_adapter!(Events<'s> = Event<'s> { link });

#[test]
fn arena_allocated_records() {
    let arena = Arena::default();
    let names = ["open", "read", "close"];
    let mut list = List::<Events<'_>>::new();
    for (seq, &name) in names.iter().enumerate() {
        let event = &*arena.alloc(Event {
            name,
            seq: seq as u64,
            link: Link::new(),
        });
        list.push_back(event);
    }
    let seen: Vec<_> = list.iter().map(|e| (e.seq, e.name)).collect();
    assert_eq!(seen, [(0, "open"), (1, "read"), (2, "close")]);

    let removed = list.remove_by(|e| e.name.starts_with('r'));
    assert_eq!(removed, 1);
    assert_eq!(list.last().map(|e| e.name), Some("close"));
}

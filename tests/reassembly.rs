//! Property tests for the data source parser and the notification decoder.
//!
//! - Any split of a response into packets yields the same attribute events
//! - Unregistered and unknown attributes are skipped by length wherever the packets split
//! - Attributes longer than their buffer are truncated without desyncing the stream
//! - Decoding a notification source packet is deterministic and total

use proptest::prelude::*;

use trouble_ancs::parser::AttributeParser;
use trouble_ancs::registry::AttributeRegistry;
use trouble_ancs::*;

type Delivered = Vec<(AttributeKind, Vec<u8>, bool)>;

#[derive(Default)]
struct Collect(Delivered);

impl EventHandler for Collect {
    fn on_event(&mut self, event: Event<'_>) {
        if let Event::Attribute(a) = event {
            self.0.push((a.kind, a.data.to_vec(), a.truncated));
        }
    }
}

const MAX_LEN: u16 = 16;

/// Attribute ids past the last known kind, which the parser must skip.
const MAX_KIND: u8 = AttributeKind::COUNT as u8 + 4;

const ALL_KINDS: u8 = 0xff;

fn response(uid: u32, attributes: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut out = vec![0];
    out.extend_from_slice(&uid.to_le_bytes());
    for (kind, data) in attributes {
        out.push(*kind);
        out.extend_from_slice(&(data.len() as u16).to_le_bytes());
        out.extend_from_slice(data);
    }
    out
}

/// Feed `stream` split at `cuts` to a parser expecting `expected` attributes.
///
/// Bit `n` of `registered` registers the kind with id `n`.
fn run(uid: u32, expected: u8, registered: u8, stream: &[u8], cuts: &[usize]) -> (Delivered, bool) {
    let mut storage = [[0u8; MAX_LEN as usize + 1]; AttributeKind::COUNT];
    let mut registry = AttributeRegistry::new();
    for (kind, buf) in AttributeKind::ALL.into_iter().zip(storage.iter_mut()) {
        if registered & (1u8 << kind as u8) != 0 {
            registry.register(kind, buf, MAX_LEN).unwrap();
        }
    }

    let mut parser = AttributeParser::new();
    parser.start(uid, expected);
    let mut events = Collect::default();
    let mut start = 0;
    for &cut in cuts.iter().chain(core::iter::once(&stream.len())) {
        let cut = cut.clamp(start, stream.len());
        parser.feed(&mut registry, &stream[start..cut], &mut events);
        start = cut;
    }
    (events.0, parser.is_in_progress())
}

fn attribute() -> impl Strategy<Value = (u8, Vec<u8>)> {
    (0u8..MAX_KIND, prop::collection::vec(any::<u8>(), 0..40))
}

/// Number of attributes the parser reports for `attributes` under `registered`.
fn reported(attributes: &[(u8, Vec<u8>)], registered: u8) -> usize {
    attributes
        .iter()
        .filter(|(kind, _)| (*kind as usize) < AttributeKind::COUNT && registered & (1u8 << *kind) != 0)
        .count()
}

proptest! {
    /// Every single split point produces the events of the unsplit stream.
    #[test]
    fn split_point_independent(
        uid in any::<u32>(),
        registered in any::<u8>(),
        attributes in prop::collection::vec(attribute(), 1..6),
    ) {
        let stream = response(uid, &attributes);
        let expected = attributes.len() as u8;
        let (whole, in_progress) = run(uid, expected, registered, &stream, &[]);
        prop_assert_eq!(whole.len(), reported(&attributes, registered));
        prop_assert!(!in_progress);

        for cut in 0..=stream.len() {
            let (split, _) = run(uid, expected, registered, &stream, &[cut]);
            prop_assert_eq!(&split, &whole);
        }
    }

    /// Arbitrary packetization produces the same events.
    #[test]
    fn packetization_independent(
        uid in any::<u32>(),
        registered in any::<u8>(),
        attributes in prop::collection::vec(attribute(), 1..6),
        cuts in prop::collection::vec(0usize..256, 0..12),
    ) {
        let stream = response(uid, &attributes);
        let expected = attributes.len() as u8;
        let mut cuts = cuts;
        cuts.sort_unstable();
        let (whole, _) = run(uid, expected, registered, &stream, &[]);
        let (split, in_progress) = run(uid, expected, registered, &stream, &cuts);
        prop_assert_eq!(whole.len(), reported(&attributes, registered));
        prop_assert_eq!(split, whole);
        prop_assert!(!in_progress);
    }

    /// Content is cut at the registered length and flagged.
    #[test]
    fn truncation(
        kind in 0u8..AttributeKind::COUNT as u8,
        data in prop::collection::vec(any::<u8>(), 0..64),
        next in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        let attributes = [(kind, data.clone()), (0, next.clone())];
        let stream = response(1, &attributes);
        let (events, _) = run(1, 2, ALL_KINDS, &stream, &[]);

        let len = data.len().min(MAX_LEN as usize);
        prop_assert_eq!(events.len(), 2);
        prop_assert_eq!(&events[0].1[..], &data[..len]);
        prop_assert_eq!(events[0].2, data.len() > MAX_LEN as usize);
        prop_assert_eq!(&events[1].1[..], &next[..next.len().min(MAX_LEN as usize)]);
    }

    /// A response for another notification produces nothing.
    #[test]
    fn uid_mismatch(
        uid in any::<u32>(),
        other in any::<u32>(),
        attributes in prop::collection::vec(attribute(), 1..4),
    ) {
        prop_assume!(uid != other);
        let stream = response(other, &attributes);
        let (events, in_progress) = run(uid, attributes.len() as u8, ALL_KINDS, &stream, &[]);
        prop_assert!(events.is_empty());
        prop_assert!(!in_progress);
    }

    /// Decoding is total over 8 byte packets and repeatable.
    #[test]
    fn decode_deterministic(data in prop::array::uniform8(any::<u8>())) {
        let first = Notification::decode(&data);
        prop_assert_eq!(first, Notification::decode(&data));

        let n = match first {
            Ok(n) => n,
            Err(InvalidNotification::OutOfRange(n)) => n,
            Err(InvalidNotification::Length(_)) => unreachable!(),
        };
        prop_assert_eq!(n.event_id.raw(), data[0]);
        prop_assert_eq!(n.flags.bits(), data[1] & 0x1f);
        prop_assert_eq!(n.category_id.raw(), data[2]);
        prop_assert_eq!(n.category_count, data[3]);
        prop_assert_eq!(n.uid, u32::from_le_bytes([data[4], data[5], data[6], data[7]]));
        prop_assert_eq!(first.is_ok(), data[0] < 3 && data[2] < 12);
    }

    /// Any other length is rejected without decoding.
    #[test]
    fn decode_wrong_length(data in prop::collection::vec(any::<u8>(), 0..32)) {
        prop_assume!(data.len() != 8);
        prop_assert_eq!(
            Notification::decode(&data),
            Err(InvalidNotification::Length(data.len()))
        );
    }
}

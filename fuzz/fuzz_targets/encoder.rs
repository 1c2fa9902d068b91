use honggfuzz::fuzz;

use fountain_ur::fountain::{join, Encoder, Options};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Some((&max_length, message)) = data.split_first() else {
                return;
            };
            let options = Options::default()
                .with_max_fragment_length(1 + max_length as usize)
                .with_min_fragment_length(1);
            let Ok(mut encoder) = Encoder::with_options(message, &options) else {
                assert!(message.is_empty());
                return;
            };
            let count = encoder.fragment_count();
            let fragments: Vec<Vec<u8>> = encoder.by_ref().take(count).map(|p| p.data).collect();
            assert_eq!(join(&fragments, message.len()).unwrap(), message);
            for part in encoder.take(count) {
                assert!(part.is_valid());
                assert!(!part.indexes().is_empty());
            }
        });
    }
}

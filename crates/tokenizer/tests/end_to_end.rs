use bytepair_tokenizer::{LearnStrategy, Tokenizer, Utf8Policy};
use std::io::Write;

const DELIM: &str = "<|endoftext|>";

fn corpus() -> String {
    let documents = [
        "Once upon a time there was a little cat. The cat liked to nap.",
        "It's 2024, and we've 1234 reasons to smile! Don't we?",
        "Café au lait, naïve résumé, 東京タワー and emoji 🙂🙂.",
        "    indented lines\n\n  and blank ones\t\tend here",
        "The little dog barked at the cat; the cat ignored the dog.",
    ];
    let mut text = String::new();
    for round in 0..20 {
        for doc in &documents {
            text.push_str(doc);
            text.push_str(&format!(" round {round}"));
            text.push_str(DELIM);
        }
    }
    text
}

fn corpus_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(corpus().as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn train(shards: usize, strategy: LearnStrategy) -> Tokenizer {
    let file = corpus_file();
    Tokenizer::builder()
        .vocab_size(400)
        .num_shards(shards)
        .probe_window(64)
        .strategy(strategy)
        .train_from_file(file.path())
        .unwrap()
}

#[test]
fn test_roundtrip_on_seen_alphabet() {
    let tokenizer = train(4, LearnStrategy::Incremental);

    for text in [
        "The cat liked to nap.",
        "  naïve 東京 🙂  ",
        "we've 2024 reasons\n\n",
        "",
        "a",
    ] {
        let ids = tokenizer.encode(text).unwrap();
        assert_eq!(tokenizer.decode(&ids).unwrap(), text, "roundtrip of {text:?}");
    }
}

#[test]
fn test_ids_below_vocab_size() {
    let tokenizer = train(2, LearnStrategy::Incremental);
    let n = tokenizer.vocab_size() as u32;

    let ids = tokenizer.encode(&corpus().replace(DELIM, " ")).unwrap();
    assert!(!ids.is_empty());
    assert!(ids.iter().all(|&id| id < n));
}

#[test]
fn test_shard_count_does_not_change_model() {
    let reference = train(1, LearnStrategy::Incremental);

    for shards in [2, 3, 7] {
        let other = train(shards, LearnStrategy::Incremental);
        assert_eq!(other.merges(), reference.merges(), "{shards} shards");
        assert_eq!(other.vocab(), reference.vocab(), "{shards} shards");
    }
}

#[test]
fn test_training_is_deterministic() {
    let a = train(4, LearnStrategy::Incremental);
    let b = train(4, LearnStrategy::Incremental);
    assert_eq!(a.merges(), b.merges());
    assert_eq!(a.vocab(), b.vocab());
}

#[test]
fn test_naive_strategy_matches_incremental() {
    let incremental = train(2, LearnStrategy::Incremental);
    let naive = train(2, LearnStrategy::Naive);
    assert_eq!(incremental.merges(), naive.merges());
    assert_eq!(incremental.vocab(), naive.vocab());
}

#[test]
fn test_file_and_text_training_agree() {
    let from_file = train(3, LearnStrategy::Incremental);
    let from_text = Tokenizer::builder()
        .vocab_size(400)
        .train_from_text(&corpus())
        .unwrap();

    assert_eq!(from_file.merges(), from_text.merges());
    assert_eq!(from_file.vocab(), from_text.vocab());
}

#[test]
fn test_encode_iterable_matches_concatenation() {
    let tokenizer = train(2, LearnStrategy::Incremental);
    let lines = ["The cat", " liked", "", " to nap.\n", "Don't"];

    let streamed: Vec<u32> = tokenizer
        .encode_iterable(lines)
        .collect::<Result<_, _>>()
        .unwrap();
    let concatenated: Vec<u32> = lines
        .iter()
        .flat_map(|line| tokenizer.encode(line).unwrap())
        .collect();
    assert_eq!(streamed, concatenated);

    // A fresh call starts over
    let again: Vec<u32> = tokenizer
        .encode_iterable(lines)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(again, streamed);
}

#[test]
fn test_empty_corpus() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let tokenizer = Tokenizer::builder()
        .vocab_size(300)
        .num_shards(4)
        .train_from_file(file.path())
        .unwrap();

    assert_eq!(tokenizer.vocab_size(), 0);
    assert!(tokenizer.merges().is_empty());
    assert_eq!(tokenizer.encode("").unwrap(), Vec::<u32>::new());
}

#[test]
fn test_delimiter_never_merged_across() {
    let tokenizer = Tokenizer::builder()
        .vocab_size(1000)
        .num_shards(1)
        .train_from_text(&format!("ab{DELIM}ab{DELIM}ab"))
        .unwrap();

    // The delimiter's own bytes never reach the vocabulary
    assert!(tokenizer.token_to_id(b"<").is_none());
    assert_eq!(tokenizer.vocab_size(), 3);
}

#[test]
fn test_save_load_preserves_behaviour() {
    let dir = tempfile::tempdir().unwrap();
    let tokenizer = Tokenizer::builder()
        .vocab_size(350)
        .utf8_policy(Utf8Policy::Ignore)
        .train_from_text(&corpus())
        .unwrap();
    tokenizer.save(dir.path()).unwrap();

    let loaded = Tokenizer::load(dir.path()).unwrap();
    assert_eq!(loaded.utf8_policy(), Utf8Policy::Ignore);
    assert_eq!(loaded.vocab(), tokenizer.vocab());
    assert_eq!(loaded.merges(), tokenizer.merges());

    let text = "The little cat ignored 東京.";
    assert_eq!(
        loaded.encode(text).unwrap(),
        tokenizer.encode(text).unwrap()
    );
}

#[test]
fn test_partial_utf8_decodes_lossily() {
    let tokenizer = train(1, LearnStrategy::Incremental);

    let ids = tokenizer.encode("東").unwrap();
    let bytes = tokenizer.decode_bytes(&ids).unwrap();
    assert_eq!(bytes, "東".as_bytes());

    // Find an id for a lone continuation byte and decode it alone
    let lone = tokenizer.token_to_id(&bytes[2..]).unwrap();
    assert_eq!(tokenizer.decode(&[lone]).unwrap(), "\u{FFFD}");
}

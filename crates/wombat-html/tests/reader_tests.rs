//! Property tests for the character reader.

use quickcheck_macros::quickcheck;
use wombat_html::reader::{CharacterReader, EOF};

#[quickcheck]
fn prop_consume_past_end_stays_put(input: String) -> bool {
    let length = input.replace("\r\n", "\n").chars().count();
    let mut reader = CharacterReader::new(&input);
    for _ in 0..length {
        let _ = reader.consume();
    }
    let at_end = reader.pos();
    reader.consume() == EOF && reader.consume() == EOF && reader.pos() == at_end && reader.is_empty()
}

#[quickcheck]
fn prop_consume_to_end_reads_everything(input: String) -> bool {
    let mut reader = CharacterReader::new(&input);
    let expected = input.replace("\r\n", "\n").replace('\r', "\n");
    reader.consume_to_end() == expected && reader.is_empty()
}

#[quickcheck]
fn prop_mark_rewind_restores_position(input: String, steps: u8) -> bool {
    let mut reader = CharacterReader::new(&input);
    reader.mark();
    for _ in 0..steps {
        let _ = reader.consume();
    }
    reader.rewind_to_mark();
    reader.pos() == 0
}

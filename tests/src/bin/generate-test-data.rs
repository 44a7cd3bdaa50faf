use chrono::Duration;
use msgboard_api::MAX_COMMENT_LEN;
use rand::Rng;

const NUM_AUTHORS: usize = 8;
const AUTHOR_ID_LEN: usize = 21;

const NUM_MESSAGES: usize = 200;
const COMMENT_MAX_WORDS: usize = 40;

fn gen_n_items(table: &str, columns: &str, n: usize, mut f: impl FnMut(usize) -> String) {
    println!("INSERT INTO {table} ({columns}) VALUES");
    for i in 0..n {
        if i != 0 {
            println!(",");
        }
        print!("    {}", f(i));
    }
    println!(";");
}

fn gen_author_id(rng: &mut impl Rng) -> String {
    (0..AUTHOR_ID_LEN)
        .map(|i| {
            // no leading zero
            let lo = if i == 0 { 1 } else { 0 };
            char::from(b'0' + rng.gen_range(lo..10u8))
        })
        .collect()
}

fn gen_comment(rng: &mut impl Rng) -> String {
    let mut comment = lipsum::lipsum_words(rng.gen_range(1..=COMMENT_MAX_WORDS));
    comment.truncate(MAX_COMMENT_LEN);
    comment.replace('\'', "''")
}

fn main() {
    let mut rng = rand::thread_rng();
    let authors = (0..NUM_AUTHORS)
        .map(|_| gen_author_id(&mut rng))
        .collect::<Vec<_>>();

    // oldest first, so that message ids grow with time
    let mut time = chrono::Utc::now().naive_utc() - Duration::days(30);
    gen_n_items(
        "messages",
        "google_plus_id, comment, created_date_time",
        NUM_MESSAGES,
        |_| {
            time += Duration::seconds(rng.gen_range(1..60 * 60 * 4));
            let author = &authors[rng.gen_range(0..authors.len())];
            format!(
                "('{}', '{}', '{}')",
                author,
                gen_comment(&mut rng),
                time.format("%Y-%m-%d %H:%M:%S%.6f"),
            )
        },
    );
}

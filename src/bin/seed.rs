//! Dev-data seeder: fills the database with fake users, a follow graph and
//! tweets. Writes through the same store the server uses.

use bcrypt::{hash, DEFAULT_COST};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use std::error::Error;

use minitweet::config::Config;
use minitweet::store::sqlite::SqliteStore;
use minitweet::store::{NewUser, Store};

fn main() -> Result<(), Box<dyn Error>> {
    println!("Starting data seeding...");

    let cfg = Config::from_env();
    let store = SqliteStore::open(&cfg.database_path)?;

    let num_users = 100;
    let tweets_per_user = 20;

    let users = seed_users(&store, num_users)?;
    seed_follows(&store, &users)?;
    seed_tweets(&store, &users, tweets_per_user)?;

    println!("Seeding completed!");
    Ok(())
}

fn seed_users(store: &SqliteStore, count: usize) -> Result<Vec<i64>, Box<dyn Error>> {
    println!("Creating {} users...", count);
    // One hash for everyone; hashing per user makes seeding crawl.
    let hashed_password = hash("password123", DEFAULT_COST)?;
    let mut users = Vec::new();

    for i in 0..count {
        let name: String = Username().fake();
        let email = format!("{i}-{}", SafeEmail().fake::<String>());
        let profile: String = Sentence(3..8).fake();

        let user = store.create_user(NewUser {
            name: name.clone(),
            email,
            profile,
            hashed_password: hashed_password.clone(),
        })?;

        println!("Created user {}/{}: {} (id {})", i + 1, count, name, user.id);
        users.push(user.id);
    }

    Ok(users)
}

fn seed_follows(store: &SqliteStore, users: &[i64]) -> Result<(), Box<dyn Error>> {
    println!("Creating follow graph...");
    let mut edges = 0;
    for (i, &follower) in users.iter().enumerate() {
        // Everyone follows the three users before them, wrapping around.
        for offset in 1..=3 {
            let followee = users[(i + users.len() - offset) % users.len()];
            if followee != follower {
                store.follow(follower, followee)?;
                edges += 1;
            }
        }
    }
    println!("Created {} follow edges", edges);
    Ok(())
}

fn seed_tweets(
    store: &SqliteStore,
    users: &[i64],
    tweets_per_user: usize,
) -> Result<(), Box<dyn Error>> {
    println!("Creating {} tweets per user...", tweets_per_user);
    let total_tweets = users.len() * tweets_per_user;
    let mut current_tweet = 0;

    for &user_id in users {
        for _ in 0..tweets_per_user {
            let body: String = Sentence(3..10).fake();
            store.post_tweet(user_id, &body)?;

            current_tweet += 1;
            if current_tweet % 100 == 0 {
                println!("Created {}/{} tweets", current_tweet, total_tweets);
            }
        }
    }

    Ok(())
}

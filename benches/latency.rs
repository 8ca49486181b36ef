use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tokio_postgres::{Client, Config, NoTls};
use ulid::Ulid;

/// 30 minute slots from 00:00 to 23:00 each day.
const SLOTS_PER_DAY: usize = 47;
const DAYS: [&str; 7] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

async fn connect(host: &str, port: u16, shop: &str) -> Client {
    let mut config = Config::new();
    config
        .host(host)
        .port(port)
        .dbname(shop)
        .user("bench")
        .password(std::env::var("SALOND_PASSWORD").unwrap_or_else(|_| "salond".into()));

    let (client, conn) = config.connect(NoTls).await.expect("connect failed");
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            eprintln!("connection error: {e}");
        }
    });
    client
}

fn fresh_shop() -> String {
    format!("bench_{}", Ulid::new())
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        println!("  {label}: no samples");
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies[latencies.len() - 1].as_secs_f64() * 1000.0,
    );
}

fn first_monday() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, 1, 7)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

/// The n-th free half hour of an always-open barber.
fn slot(n: usize) -> String {
    let day = (n / SLOTS_PER_DAY) as i64;
    let half_hours = (n % SLOTS_PER_DAY) as i64;
    let t = first_monday() + TimeDelta::days(day) + TimeDelta::minutes(30 * half_hours);
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}

struct Shop {
    barber: String,
    service: String,
}

/// A barber open 00:00-23:30 every day and a 30 minute service.
async fn setup(client: &Client) -> Shop {
    let barber: String = client
        .query_one("INSERT INTO barbers (name) VALUES ('Bench')", &[])
        .await
        .unwrap()
        .get(0);
    for day in DAYS {
        client
            .batch_execute(&format!(
                "INSERT INTO availability (barber_id, day_of_week, start_time, end_time) \
                 VALUES ('{barber}', '{day}', '00:00', '23:30')"
            ))
            .await
            .unwrap();
    }
    let service: String = client
        .query_one(
            "INSERT INTO services (name, duration_minutes, price_cents) VALUES ('Trim', 30, 1500)",
            &[],
        )
        .await
        .unwrap()
        .get(0);
    Shop { barber, service }
}

async fn book(client: &Client, shop: &Shop, date_time: &str, n: usize) -> Result<(), tokio_postgres::Error> {
    client
        .batch_execute(&format!(
            "INSERT INTO appointments (customer_name, customer_email, customer_phone, barber_id, service_id, date_time) \
             VALUES ('Guest {n}', 'guest{n}@example.com', '555-{n:04}', '{}', '{}', '{date_time}')",
            shop.barber, shop.service
        ))
        .await
}

async fn phase1_sequential(host: &str, port: u16) {
    let client = connect(host, port, &fresh_shop()).await;
    let shop = setup(&client).await;

    let n = 2000;
    let mut latencies = Vec::with_capacity(n);
    let start = Instant::now();
    for i in 0..n {
        let t = Instant::now();
        book(&client, &shop, &slot(i), i).await.unwrap();
        latencies.push(t.elapsed());
    }

    let elapsed = start.elapsed();
    let ops = n as f64 / elapsed.as_secs_f64();
    println!("  {n} bookings in {:.2}s = {ops:.0} ops/sec", elapsed.as_secs_f64());
    print_latency("booking latency", &mut latencies);
}

async fn phase2_concurrent(host: &str, port: u16) {
    let n_tasks = 10;
    let n_per_task = 200;

    let start = Instant::now();
    let mut handles = Vec::new();
    for _ in 0..n_tasks {
        let host = host.to_string();
        handles.push(tokio::spawn(async move {
            let client = connect(&host, port, &fresh_shop()).await;
            let shop = setup(&client).await;
            for j in 0..n_per_task {
                book(&client, &shop, &slot(j), j).await.unwrap();
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let elapsed = start.elapsed();
    let total = n_tasks * n_per_task;
    let ops = total as f64 / elapsed.as_secs_f64();
    println!(
        "  {n_tasks} shops x {n_per_task} bookings = {total} total in {:.2}s = {ops:.0} ops/sec",
        elapsed.as_secs_f64()
    );
}

/// Many clients racing for the same half hour: exactly one should win.
async fn phase3_contended_slot(host: &str, port: u16) {
    let shop_name = fresh_shop();
    let setup_client = connect(host, port, &shop_name).await;
    let shop = Arc::new(setup(&setup_client).await);

    let n_clients = 50;
    let mut handles = Vec::new();
    for i in 0..n_clients {
        let host = host.to_string();
        let shop_name = shop_name.clone();
        let shop = shop.clone();
        handles.push(tokio::spawn(async move {
            let client = connect(&host, port, &shop_name).await;
            let t = Instant::now();
            let result = book(&client, &shop, &slot(0), i).await;
            let code = result.err().and_then(|e| e.code().map(|c| c.code().to_string()));
            (t.elapsed(), code)
        }));
    }

    let mut latencies = Vec::new();
    let mut accepted = 0;
    let mut conflicts = 0;
    for h in handles {
        let (elapsed, code) = h.await.unwrap();
        latencies.push(elapsed);
        match code.as_deref() {
            None => accepted += 1,
            Some("23P01") => conflicts += 1,
            Some(other) => println!("  unexpected sqlstate {other}"),
        }
    }
    println!("  {accepted} accepted, {conflicts} conflicts");
    if accepted != 1 {
        println!("  WARNING: expected exactly one accepted booking");
    }
    print_latency("decision latency", &mut latencies);
}

async fn phase4_reads_under_load(host: &str, port: u16) {
    let shop_name = fresh_shop();
    let setup_client = connect(host, port, &shop_name).await;
    let shop = Arc::new(setup(&setup_client).await);

    let writer_shop = shop.clone();
    let writer_host = host.to_string();
    let writer_name = shop_name.clone();
    let writer = tokio::spawn(async move {
        let client = connect(&writer_host, port, &writer_name).await;
        for i in 0..1000 {
            book(&client, &writer_shop, &slot(i), i).await.unwrap();
        }
    });

    let reader = connect(host, port, &shop_name).await;
    let mut latencies = Vec::new();
    while !writer.is_finished() {
        let day = first_monday().date() + TimeDelta::days((latencies.len() % 7) as i64);
        let t = Instant::now();
        reader
            .simple_query(&format!(
                "SELECT * FROM open_slots WHERE barber_id = '{}' AND service_id = '{}' AND on_date = '{day}'",
                shop.barber, shop.service
            ))
            .await
            .unwrap();
        latencies.push(t.elapsed());
    }
    writer.await.unwrap();
    print_latency("open_slots latency", &mut latencies);
}

#[tokio::main]
async fn main() {
    let host = std::env::var("SALOND_HOST").unwrap_or_else(|_| "127.0.0.1".into());
    let port: u16 = std::env::var("SALOND_PORT")
        .unwrap_or_else(|_| "5433".into())
        .parse()
        .expect("invalid SALOND_PORT");

    println!("=== salond booking latency benchmark ===");
    println!("target: {host}:{port}\n");

    println!("[phase 1] sequential bookings");
    phase1_sequential(&host, port).await;

    println!("\n[phase 2] concurrent bookings across shops");
    phase2_concurrent(&host, port).await;

    println!("\n[phase 3] contended slot");
    phase3_contended_slot(&host, port).await;

    println!("\n[phase 4] open slot reads under booking load");
    phase4_reads_under_load(&host, port).await;

    println!("\n=== benchmark complete ===");
}

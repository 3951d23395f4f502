use serde::Serialize;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Serialize)]
struct Row {
    name: String,
    market: &'static str,
    country_code: &'static str,
    status: &'static str,
    founded_year: String,
    funding_total_usd: String,
    funding_rounds: u32,
    homepage_url: String,
}

const MARKETS: [&str; 12] = [
    "software",
    "biotech",
    "e-commerce",
    "fintech",
    "games",
    "analytics",
    "security",
    "education",
    "hardware",
    "clean energy",
    "mobile",
    "advertising",
];

const COUNTRIES: [&str; 7] = ["USA", "GBR", "DEU", "FRA", "IND", "CAN", "ISR"];

const NAME_HEADS: [&str; 10] = [
    "Nova", "Blue", "Quant", "Deep", "Bright", "Hyper", "Open", "Iron", "Echo", "Pulse",
];
const NAME_TAILS: [&str; 10] = [
    "Works", "Labs", "Metrics", "Systems", "Loop", "Forge", "Mind", "Grid", "Scale", "Base",
];

fn main() {
    let mut rng = SimpleRng::new(42);
    let output_path = "cleaned_investments.csv";

    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");

    let total = 1500;
    for i in 0..total {
        let market = *rng.pick(&MARKETS);

        // Bias toward USA so the default country filter has plenty to show.
        let country = if rng.next_f64() < 0.45 {
            "USA"
        } else {
            *rng.pick(&COUNTRIES)
        };

        let roll = rng.next_f64();
        let status = if roll < 0.75 {
            "operating"
        } else if roll < 0.90 {
            "acquired"
        } else {
            "closed"
        };

        // A few dirty cells exercise the coerce-with-fallback path.
        let founded_year = if rng.next_f64() < 0.03 {
            "unknown".to_string()
        } else {
            rng.range(1995, 2014).to_string()
        };

        // Log-normal-ish funding centred around $1M.
        let funding = 10f64.powf(rng.gauss(6.0, 1.0)).round();
        let funding_total_usd = if rng.next_f64() < 0.02 {
            String::new()
        } else {
            format!("{funding:.0}")
        };

        let funding_rounds = 1 + (funding.log10().max(0.0) as u32) / 2;

        let head = *rng.pick(&NAME_HEADS);
        let tail = *rng.pick(&NAME_TAILS);
        let name = format!("{head}{tail} {i:04}");

        let homepage_url = match rng.next_f64() {
            r if r < 0.85 => format!(
                "http://www.{}{}.com",
                head.to_lowercase(),
                tail.to_lowercase()
            ),
            r if r < 0.92 => format!("www.{}.com", head.to_lowercase()),
            _ => String::new(),
        };

        writer
            .serialize(Row {
                name,
                market,
                country_code: country,
                status,
                founded_year,
                funding_total_usd,
                funding_rounds,
                homepage_url,
            })
            .expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {total} startups to {output_path}");
}

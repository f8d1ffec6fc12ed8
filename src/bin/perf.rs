use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};
use structopt::StructOpt;

use std::time;

use rbset::OSet;

/// Command line options.
#[derive(Clone, StructOpt)]
pub struct Opt {
    #[structopt(long = "seed")]
    seed: Option<u64>,

    #[structopt(long = "loads", default_value = "1000000")] // default 1M
    loads: usize,

    #[structopt(long = "inserts", default_value = "0")]
    inserts: usize,

    #[structopt(long = "dels", default_value = "0")]
    dels: usize,

    #[structopt(long = "gets", default_value = "0")]
    gets: usize,

    #[structopt(long = "succs", default_value = "0")]
    succs: usize,
}

fn main() {
    let opts = Opt::from_args();
    let seed = opts.seed.unwrap_or_else(random);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut index: OSet<u64> = OSet::new();

    // initial load
    let start = time::Instant::now();
    for _i in 0..opts.loads {
        index.insert(rng.gen::<u64>());
    }

    println!("loaded {} items in {:?}", opts.loads, start.elapsed());

    do_incremental(seed + 100, &opts, &mut index);

    let start = time::Instant::now();
    index.validate().unwrap();
    println!("validated {} items in {:?}", index.len(), start.elapsed());

    let start = time::Instant::now();
    let n = index.to_text().len();
    println!("rendered {} bytes in {:?}", n, start.elapsed());
}

fn do_incremental(seed: u64, opts: &Opt, index: &mut OSet<u64>) {
    let mut rng = SmallRng::seed_from_u64(seed);

    let start = time::Instant::now();
    let total = opts.inserts + opts.dels + opts.gets + opts.succs;
    let mut n = total;
    while n > 0 {
        let op = rng.gen::<usize>() % total;

        let key = rng.gen::<u64>();
        if op < opts.inserts {
            index.insert(key);
        } else if op < (opts.inserts + opts.dels) {
            index.delete(&key);
        } else if op < (opts.inserts + opts.dels + opts.gets) {
            index.search(&key);
        } else {
            index.successor(&key);
        }
        n -= 1;
    }
    println!(
        "incremental for operations {}, took {:?}",
        total,
        start.elapsed()
    );
}

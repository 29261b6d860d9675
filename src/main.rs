use bounded_executor::{run_sequence_collect, RunContext};
use tokio::runtime::Builder;
use std::time::Instant;


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let rt = match Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to build runtime: {err}");
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let now = Instant::now();
        let ctx = RunContext::new();
        let mut sum: u64 = 0;

        let outcome = run_sequence_collect(
            &ctx,
            0,
            0..1_000_000u64,
            |x| async move { Ok::<_, String>(x * 2) },
            |x| {
                sum += x;
                Ok(())
            },
        )
        .await;

        match outcome {
            Ok(()) => println!("sum: {sum}, elapsed: {:?}", now.elapsed()),
            Err(err) => eprintln!("run failed: {err}"),
        }
    });
}

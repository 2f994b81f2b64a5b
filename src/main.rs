use std::fs::File;
use std::io::{BufWriter, Write};

use xolsim::params::SimulationParameters;
use xolsim::simulation::{SimulationOutput, simulate};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut params = SimulationParameters::canonical();
    let mut output_path: Option<String> = None;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => {
                i += 1;
                params.limit = args[i].parse().expect("--limit requires a number");
            }
            "--aggregate-limit" => {
                i += 1;
                params.aggregate_limit =
                    args[i].parse().expect("--aggregate-limit requires a number");
            }
            "--policy-limit" => {
                i += 1;
                params.policy_limit = args[i].parse().expect("--policy-limit requires a number");
            }
            "--excess" => {
                i += 1;
                params.excess = args[i].parse().expect("--excess requires a number");
            }
            "--aggregate-deductible" => {
                i += 1;
                params.aggregate_deductible =
                    args[i].parse().expect("--aggregate-deductible requires a number");
            }
            "--premium" => {
                i += 1;
                params.premium = args[i].parse().expect("--premium requires a number");
            }
            "--mean-frequency" => {
                i += 1;
                params.mean_frequency =
                    args[i].parse().expect("--mean-frequency requires a number");
            }
            "--severity-shape" => {
                i += 1;
                params.severity_shape =
                    args[i].parse().expect("--severity-shape requires a number");
            }
            "--severity-scale" => {
                i += 1;
                params.severity_scale =
                    args[i].parse().expect("--severity-scale requires a number");
            }
            "--severity-location" => {
                i += 1;
                params.severity_location =
                    args[i].parse().expect("--severity-location requires a number");
            }
            "--trials" => {
                i += 1;
                params.n_trials = args[i].parse().expect("--trials requires a positive integer");
            }
            "--seed" => {
                i += 1;
                params.seed = args[i].parse().expect("--seed requires a u64");
            }
            "--serial" => params.parallel = false,
            "--output" => {
                i += 1;
                output_path = Some(args[i].clone());
            }
            "--quiet" => quiet = true,
            _ => {}
        }
        i += 1;
    }

    let output = match simulate(&params) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if let Some(ref path) = output_path {
        let file = File::create(path).unwrap_or_else(|e| panic!("failed to create {path}: {e}"));
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &output.recoveries)
            .expect("failed to serialize recoveries");
        writeln!(writer).expect("failed to write newline");
        if !quiet {
            println!("Recoveries ({} trials) → {path}", output.recoveries.len());
        }
    }

    if !quiet {
        print_report(&params, &output);
    }
}

fn print_report(params: &SimulationParameters, output: &SimulationOutput) {
    let s = &output.statistics;

    println!("\n=== Recovery statistics ({} trials, seed {}) ===", params.n_trials, params.seed);
    println!("  Expected recoveries (mean):   {:>18.2}", s.mean);
    println!("  Mode of recoveries:           {:>18.2}", s.mode);
    println!("  Probability recoveries > 0:   {:>17.2}%", s.prob_positive * 100.0);
    println!("  1st percentile:               {:>18.2}", s.p1);
    println!("  25th percentile:              {:>18.2}", s.p25);
    println!("  Median recoveries:            {:>18.2}", s.median);
    println!("  75th percentile:              {:>18.2}", s.p75);
    println!("  99th percentile:              {:>18.2}", s.p99);
    println!("  Worst case scenario (max):    {:>18.2}", s.worst_case);

    let total_reinstatement: f64 = output.reinstatement_costs.iter().sum();
    println!(
        "  Mean reinstatement cost:      {:>18.2}",
        total_reinstatement / output.reinstatement_costs.len() as f64
    );

    println!("\n=== Recovery distribution ===");
    println!("{:>24} | {:>10} | {:>7}", "Band", "Trials", "Share");
    println!("{}", "-".repeat(24 + 3 + 10 + 3 + 7));
    let n = output.recoveries.len() as f64;
    for band in &output.bins {
        let label = band.label.trim_start_matches("Recoveries = ").trim_start_matches("Recoveries ");
        println!("{:>24} | {:>10} | {:>6.2}%", label, band.count, band.count as f64 / n * 100.0);
    }

    println!("\n=== Sensitivity: mean recovery by parameter ===");
    println!(
        "{:>16} | {:>16} | {:>16} | {:>16}",
        "Limit", "Mean recovery", "Excess", "Mean recovery"
    );
    println!("{}", "-".repeat(16 * 4 + 3 * 3));
    for (lp, ep) in output
        .sensitivity
        .limit_curve
        .iter()
        .zip(&output.sensitivity.excess_curve)
    {
        println!(
            "{:>16.0} | {:>16.2} | {:>16.0} | {:>16.2}",
            lp.parameter, lp.mean_recovery, ep.parameter, ep.mean_recovery
        );
    }
}

use itsy::{
    lang::code::pretty_print_image,
    runtime::{built_ins::register_primitives, data_structures::dictionary::HEADER_CELLS},
    Compiler, Config, Interpreter, InterpreterStack, Result,
};
use std::env::args;

/// Compile the demonstration program.  Input arrives already tokenized, so the program is spelled
/// out as calls into the compiler in source order.
fn compile_demo(compiler: &mut Compiler) -> Result<()> {
    register_primitives(compiler)?;

    // variable counter
    let _ = compiler.compile_variable("counter", 0)?;

    // : bump  counter @ 1+ counter ! ;
    let _ = compiler.compile_colon_start("bump")?;
    let _ = compiler.compile_call_by_name("counter")?;
    let _ = compiler.compile_call_by_name("@")?;
    let _ = compiler.compile_call_by_name("1+")?;
    let _ = compiler.compile_call_by_name("counter")?;
    let _ = compiler.compile_call_by_name("!")?;
    let _ = compiler.compile_colon_end()?;

    // : sign  dup 0= if drop 0 else 0 < if -1 else 1 endif endif ;
    let _ = compiler.compile_colon_start("sign")?;
    let _ = compiler.compile_call_by_name("dup")?;
    let _ = compiler.compile_call_by_name("0=")?;
    let _ = compiler.compile_if()?;
    let _ = compiler.compile_call_by_name("drop")?;
    let _ = compiler.compile_literal(0)?;
    let _ = compiler.compile_else()?;
    let _ = compiler.compile_literal(0)?;
    let _ = compiler.compile_call_by_name("<")?;
    let _ = compiler.compile_if()?;
    let _ = compiler.compile_literal(-1)?;
    let _ = compiler.compile_else()?;
    let _ = compiler.compile_literal(1)?;
    let _ = compiler.compile_endif()?;
    let _ = compiler.compile_endif()?;
    let _ = compiler.compile_colon_end()?;

    // : ticker  begin bump again ;
    let _ = compiler.compile_colon_start("ticker")?;
    let _ = compiler.compile_begin()?;
    let _ = compiler.compile_call_by_name("bump")?;
    let _ = compiler.compile_again()?;
    let _ = compiler.compile_colon_end()?;

    compiler.finish()
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let mut compiler = Compiler::new(&config)?;

    compile_demo(&mut compiler)?;

    print!("{}", pretty_print_image(compiler.image()));
    println!();
    print!("{}", compiler.dictionary().words(compiler.image()));

    // Every argument is a word to run, in order.  Without arguments bump the counter twice.
    let script_args: Vec<String> = args().skip(1).collect();
    let words = if script_args.is_empty() {
        vec!["bump".to_string(), "bump".to_string()]
    } else {
        script_args
    };

    let mut interpreter = Interpreter::new(&config);

    for word in &words {
        interpreter.execute_word(&mut compiler, word)?;
    }

    if let Some(counter) = compiler.resolve("counter") {
        let value = compiler.image().get_cell(counter.offset(HEADER_CELLS))?;
        println!("\ncounter = {}", value);
    }

    println!("stack: {:?}", interpreter.stack());

    Ok(())
}

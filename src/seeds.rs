//! Built-in content: the daily challenge template catalog, the language list and
//! the starter vocabulary bank. Everything here works without any config file.

use crate::domain::{
  AnswerOption, ChallengeRule, ChallengeTemplate, Difficulty, Language, LanguagePair, Question, QuestionKind,
  QuestionLevel, Reward, VocabularySet,
};

fn reward(xp: u32, badge: &str, title: Option<&str>) -> Reward {
  Reward { xp, badge: Some(badge.into()), title: title.map(Into::into) }
}

fn template(
  title: &str,
  description: &str,
  rule: ChallengeRule,
  difficulty: Difficulty,
  target: u32,
  reward: Reward,
  icon: &str,
  color: &str,
) -> ChallengeTemplate {
  ChallengeTemplate {
    title: title.into(),
    description: description.into(),
    rule,
    difficulty,
    target,
    reward,
    icon: icon.into(),
    color: color.into(),
  }
}

/// The curated daily challenge catalog. Order matters: pools keep catalog order,
/// and the daily pick indexes into them.
pub fn seed_templates() -> Vec<ChallengeTemplate> {
  use ChallengeRule::*;
  use Difficulty::*;
  vec![
    template("Quick Fire", "Answer 5 questions correctly in under 30 seconds",
      Speed { time_limit: 30 }, Easy, 5, reward(50, "⚡", None), "⚡", "from-yellow-500 to-orange-500"),
    template("Perfect Start", "Get your first 3 answers correct",
      Streak, Easy, 3, reward(30, "🎯", None), "🎯", "from-green-500 to-emerald-500"),
    template("Animal Lover", "Complete 4 questions from the Animals category",
      Category { category: "Animals".into() }, Easy, 4, reward(40, "🐾", None), "🐾", "from-blue-500 to-cyan-500"),

    template("Speed Demon", "Answer 10 questions correctly in under 60 seconds",
      Speed { time_limit: 60 }, Medium, 10, reward(100, "🏃", Some("Speed Demon")), "🏃", "from-purple-500 to-pink-500"),
    template("Streak Master", "Get 8 correct answers in a row",
      Streak, Medium, 8, reward(80, "🔥", None), "🔥", "from-red-500 to-orange-500"),
    template("Ace Student", "Achieve 100% accuracy on 6 questions",
      Accuracy, Medium, 6, reward(90, "💯", Some("Perfectionist")), "💯", "from-indigo-500 to-purple-500"),
    template("Daily Grind", "Complete 15 questions today",
      Volume, Medium, 15, reward(70, "📚", None), "📚", "from-teal-500 to-green-500"),

    template("Lightning Round", "Answer 15 questions correctly in under 90 seconds",
      Speed { time_limit: 90 }, Hard, 15, reward(200, "⚡", Some("Lightning Master")), "⚡", "from-yellow-400 to-red-500"),
    template("Unstoppable", "Get 15 correct answers in a row",
      Streak, Hard, 15, reward(150, "🚀", Some("Unstoppable")), "🚀", "from-purple-600 to-pink-600"),
    template("Polyglot Practice", "Complete questions from 3 different language pairs",
      MultiLanguage { language_pairs: vec!["en-es".into(), "en-fr".into(), "en-de".into()] },
      Hard, 3, reward(120, "🌍", Some("Polyglot")), "🌍", "from-blue-600 to-purple-600"),
    template("Marathon", "Complete 25 questions today",
      Volume, Hard, 25, reward(180, "🏃‍♂️", Some("Marathon Runner")), "🏃‍♂️", "from-orange-500 to-red-600"),
  ]
}

pub fn seed_languages() -> Vec<Language> {
  [
    ("en", "English", "English", "🇺🇸"),
    ("es", "Spanish", "Español", "🇪🇸"),
    ("fr", "French", "Français", "🇫🇷"),
    ("de", "German", "Deutsch", "🇩🇪"),
    ("it", "Italian", "Italiano", "🇮🇹"),
    ("pt", "Portuguese", "Português", "🇵🇹"),
    ("ja", "Japanese", "日本語", "🇯🇵"),
    ("ko", "Korean", "한국어", "🇰🇷"),
    ("zh", "Chinese", "中文", "🇨🇳"),
    ("ru", "Russian", "Русский", "🇷🇺"),
  ]
  .into_iter()
  .map(|(code, name, native, flag)| Language {
    code: code.into(),
    name: name.into(),
    native_name: native.into(),
    flag: flag.into(),
  })
  .collect()
}

/// English → X pairs offered on the home screen.
pub fn seed_language_pairs() -> Vec<LanguagePair> {
  let langs = seed_languages();
  langs
    .iter()
    .filter(|l| l.code != "en")
    .map(|to| LanguagePair {
      id: format!("en-{}", to.code),
      from: "en".into(),
      to: to.code.clone(),
      name: format!("English → {}", to.name),
    })
    .collect()
}

/// Expands to a beginner translate question; option ids are a, b, c, d in order and
/// the option whose text equals the correct answer is the right one.
macro_rules! question {
  ($id:expr, $cat:expr, $q:expr, $answer:expr, [$($opt:expr),+ $(,)?], $expl:expr) => {{
    let ids = ["a", "b", "c", "d", "e", "f"];
    let texts: Vec<&str> = vec![$($opt),+];
    Question {
      id: $id.into(),
      question: $q.into(),
      options: texts
        .iter()
        .zip(ids.iter())
        .map(|(t, id)| AnswerOption { id: (*id).into(), text: (*t).into(), is_correct: *t == $answer })
        .collect(),
      correct_answer: $answer.into(),
      explanation: Some($expl.into()),
      kind: QuestionKind::Translate,
      level: QuestionLevel::Beginner,
      category: $cat.into(),
    }
  }};
}

pub fn seed_vocabulary() -> Vec<VocabularySet> {
  vec![
    VocabularySet {
      language_pair_id: "en-es".into(),
      questions: vec![
        question!("en-es-1", "Animals", "Cat", "Gato", ["Perro", "Gato", "Casa", "Agua"], "Cat translates to \"Gato\" in Spanish."),
        question!("en-es-2", "Greetings", "Hello", "Hola", ["Hola", "Adiós", "Gracias", "Por favor"], "Hello is the most common greeting, \"Hola\" in Spanish."),
        question!("en-es-3", "Nature", "Water", "Agua", ["Fuego", "Tierra", "Agua", "Aire"], "Water translates to \"Agua\" in Spanish."),
        question!("en-es-4", "Buildings", "House", "Casa", ["Coche", "Casa", "Escuela", "Trabajo"], "House translates to \"Casa\" in Spanish."),
        question!("en-es-5", "Politeness", "Thank you", "Gracias", ["De nada", "Por favor", "Gracias", "Perdón"], "Thank you translates to \"Gracias\" in Spanish."),
        question!("en-es-6", "Animals", "Dog", "Perro", ["Gato", "Perro", "Pájaro", "Pez"], "Dog translates to \"Perro\" in Spanish."),
        question!("en-es-7", "Colors", "Red", "Rojo", ["Azul", "Verde", "Rojo", "Amarillo"], "Red translates to \"Rojo\" in Spanish."),
        question!("en-es-8", "Objects", "Book", "Libro", ["Mesa", "Silla", "Libro", "Ventana"], "Book translates to \"Libro\" in Spanish."),
        question!("en-es-9", "Greetings", "Good morning", "Buenos días", ["Buenas noches", "Buenos días", "Buenas tardes", "Hasta luego"], "Good morning translates to \"Buenos días\" in Spanish."),
        question!("en-es-10", "Food", "Food", "Comida", ["Bebida", "Comida", "Plato", "Mesa"], "Food translates to \"Comida\" in Spanish."),
      ],
    },
    VocabularySet {
      language_pair_id: "en-fr".into(),
      questions: vec![
        question!("en-fr-1", "Animals", "Cat", "Chat", ["Chien", "Chat", "Maison", "Eau"], "Cat translates to \"Chat\" in French."),
        question!("en-fr-2", "Greetings", "Hello", "Bonjour", ["Bonjour", "Au revoir", "Merci", "S'il vous plaît"], "Hello translates to \"Bonjour\" in French."),
        question!("en-fr-3", "Nature", "Water", "Eau", ["Feu", "Terre", "Eau", "Air"], "Water translates to \"Eau\" in French."),
        question!("en-fr-4", "Buildings", "House", "Maison", ["Voiture", "Maison", "École", "Travail"], "House translates to \"Maison\" in French."),
        question!("en-fr-5", "Politeness", "Thank you", "Merci", ["De rien", "S'il vous plaît", "Merci", "Pardon"], "Thank you translates to \"Merci\" in French."),
        question!("en-fr-6", "Animals", "Dog", "Chien", ["Chat", "Chien", "Oiseau", "Poisson"], "Dog translates to \"Chien\" in French."),
        question!("en-fr-7", "Colors", "Red", "Rouge", ["Bleu", "Vert", "Rouge", "Jaune"], "Red translates to \"Rouge\" in French."),
        question!("en-fr-8", "Objects", "Book", "Livre", ["Table", "Chaise", "Livre", "Fenêtre"], "Book translates to \"Livre\" in French."),
      ],
    },
    VocabularySet {
      language_pair_id: "en-de".into(),
      questions: vec![
        question!("en-de-1", "Animals", "Cat", "Katze", ["Hund", "Katze", "Haus", "Wasser"], "Cat translates to \"Katze\" in German."),
        question!("en-de-2", "Greetings", "Hello", "Hallo", ["Hallo", "Auf Wiedersehen", "Danke", "Bitte"], "Hello translates to \"Hallo\" in German."),
        question!("en-de-3", "Nature", "Water", "Wasser", ["Feuer", "Erde", "Wasser", "Luft"], "Water translates to \"Wasser\" in German."),
        question!("en-de-4", "Buildings", "House", "Haus", ["Auto", "Haus", "Schule", "Arbeit"], "House translates to \"Haus\" in German."),
        question!("en-de-5", "Politeness", "Thank you", "Danke", ["Bitte schön", "Bitte", "Danke", "Entschuldigung"], "Thank you translates to \"Danke\" in German."),
      ],
    },
    VocabularySet {
      language_pair_id: "en-ja".into(),
      questions: vec![
        question!("en-ja-1", "Animals", "Cat", "猫 (ねこ)", ["犬 (いぬ)", "猫 (ねこ)", "家 (いえ)", "水 (みず)"], "Cat translates to \"猫 (ねこ)\" in Japanese."),
        question!("en-ja-2", "Greetings", "Hello", "こんにちは", ["こんにちは", "さようなら", "ありがとう", "すみません"], "Hello translates to \"こんにちは\" in Japanese."),
        question!("en-ja-3", "Nature", "Water", "水 (みず)", ["火 (ひ)", "土 (つち)", "水 (みず)", "空気 (くうき)"], "Water translates to \"水 (みず)\" in Japanese."),
        question!("en-ja-4", "Buildings", "House", "家 (いえ)", ["車 (くるま)", "家 (いえ)", "学校 (がっこう)", "仕事 (しごと)"], "House translates to \"家 (いえ)\" in Japanese."),
        question!("en-ja-5", "Politeness", "Thank you", "ありがとう", ["どういたしまして", "お願いします", "ありがとう", "すみません"], "Thank you translates to \"ありがとう\" in Japanese."),
      ],
    },
  ]
}

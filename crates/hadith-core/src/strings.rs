//! User-facing Arabic text.
//!
//! All labels and messages shown to the user live here so the rest of the
//! crate never embeds display text.

pub const GREETING: &str = "السلام عليكم ورحمة الله وبركاته. أنا مساعدك المتخصص في التحقق من صحة الأحاديث النبوية.\nتفضل بكتابة نص الحديث المبحوث عنه، وسأوافيك بحكم المحدثين عليه.";

pub const NO_PRECISE_RESULT: &str = "عذراً، لم أتمكن من العثور على نتيجة دقيقة.";

pub const DEFAULT_SOURCE_TITLE: &str = "مصدر خارجي";

pub const ERROR_CONNECTIVITY: &str = "عذراً، حدث خطأ في الاتصال بالمصادر. يرجى المحاولة لاحقاً.";

pub const ERROR_QUOTA: &str = "عذراً، تجاوزنا الحد المسموح للطلبات حاليًا (خطأ 429). يرجى الانتظار دقيقة أو التحقق من إعدادات حساب Google AI (تفعيل الفوترة لزيادة الحدود).";

pub const ERROR_MODEL_UNAVAILABLE: &str = "عذراً، النموذج غير متوفر (خطأ 404). يرجى التحقق من اسم النموذج في الإعدادات.";

pub const LOADING: &str = "جاري مراجعة المصادر";

pub const LABEL_USER: &str = "السائل";
pub const LABEL_ASSISTANT: &str = "المحقق الشرعي";
pub const LABEL_STATUS: &str = "الدرجة";
pub const LABEL_TEXT: &str = "🔹 نص الحديث المبحوث";
pub const LABEL_SOURCE: &str = "📘 التخريج";
pub const LABEL_GRADE: &str = "✅ حكم المحدثين";
pub const LABEL_WEAKNESS: &str = "⚠️ علة الحديث";
pub const LABEL_ALTERNATIVE: &str = "✨ البديل الصحيح المعتمد";
pub const LABEL_NOTE: &str = "📝 فائدة توضيحية";
pub const LABEL_LINKS: &str = "روابط المراجعة";
pub const LABEL_REFERENCE: &str = "المرجع";

pub const APP_TITLE: &str = "محقق الأحاديث";
pub const APP_SUBTITLE: &str = "تحقيق معتمد من أمهات الكتب";
pub const INPUT_PLACEHOLDER: &str = "اكتب الحديث هنا للتحقق...";
pub const EXAMPLES_PROMPT: &str = "اكتب الحديث أو جزءاً منه للتأكد من صحته:";

pub const CONFIRM_RESET: &str = "هل تريد مسح المحادثة بالكامل؟ لا يمكن التراجع عن ذلك.";
pub const NOTICE_RESET: &str = "تم مسح المحادثة";
pub const NOTICE_COPIED: &str = "تم النسخ";
pub const NOTICE_SHARED: &str = "تم نسخ نص المشاركة";
pub const NOTICE_NOTHING_TO_COPY: &str = "لا يوجد نص حديث لنسخه";

/// Example prompts offered while the conversation holds only the greeting
pub const EXAMPLES: [&str; 4] = [
    "من صام رمضان إيماناً واحتساباً",
    "حديث: من قرأ سورة يس في ليلة أصبح مغفوراً له",
    "لا تزال طائفة من أمتي على الحق ظاهرين",
    "الجنه تحت اقدام الامهات",
];
